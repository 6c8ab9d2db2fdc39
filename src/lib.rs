//! Pomodoro session engine: a tick-driven focus timer, an append-only
//! session ledger with pluggable persistence, a coding-activity tracker, and
//! pure statistics recomputed from the ledger on demand.
//!
//! [`session::SessionOrchestrator`] ties the pieces together; the individual
//! modules are usable on their own.

pub mod ledger;
pub mod models;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;
pub mod tracking;

pub use ledger::{LedgerError, SessionLedger};
pub use models::{CodingActivity, Phase, SessionCodingStats, SessionRecord, SoundType};
pub use session::{
    SessionOrchestrator, FOCUS_DURATION_SECS, LONG_BREAK_DURATION_SECS, SHORT_BREAK_DURATION_SECS,
};
pub use store::{MemoryStore, SqliteStore, Store};
pub use timer::{TimerEngine, TimerError, TimerEvent, TimerHooks, TimerSnapshot};
pub use tracking::{ActivityFeed, CodingTracker, EditEvent};
