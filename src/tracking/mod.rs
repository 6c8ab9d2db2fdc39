mod tracker;

pub use tracker::CodingTracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SessionCodingStats;

/// Inter-edit gaps at or above this are treated as idle time and do not
/// count toward active coding time.
pub const IDLE_GAP_CUTOFF_SECS: i64 = 30;

/// One editing fact delivered by the host editor while a tracking window is
/// open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditEvent {
    pub file_id: String,
    pub language: String,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub lines_modified: u64,
    pub characters_typed: u64,
    pub keystrokes: u64,
    pub at: DateTime<Utc>,
}

/// The coding-activity feed as the orchestrator consumes it. Tracking
/// windows open and close in lockstep with Focus sessions; `stop_tracking`
/// yields the window's aggregate.
pub trait ActivityFeed: Send + Sync {
    fn start_tracking(&self);

    fn stop_tracking(&self) -> SessionCodingStats;

    /// Live snapshot of the currently open window.
    fn current_stats(&self) -> SessionCodingStats;
}
