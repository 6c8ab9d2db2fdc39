use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionCodingStats;

/// Timer mode for a run. `Idle` is the resting state between runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Focus,
    ShortBreak,
    LongBreak,
    Custom,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Focus => "Focus",
            Phase::ShortBreak => "ShortBreak",
            Phase::LongBreak => "LongBreak",
            Phase::Custom => "Custom",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SoundType {
    None,
    Lofi,
    Rain,
}

impl SoundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundType::None => "None",
            SoundType::Lofi => "Lofi",
            SoundType::Rain => "Rain",
        }
    }
}

/// One timer run as recorded in the ledger. Mutable while it is the open
/// draft; immutable once finalized and appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub phase: Phase,
    pub planned_duration_secs: u64,
    pub actual_duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub completed: bool,
    pub interrupted: bool,
    pub interruption_count: u32,
    pub sound_used: Option<SoundType>,
    pub project_name: Option<String>,
    pub coding_stats: Option<SessionCodingStats>,
}
