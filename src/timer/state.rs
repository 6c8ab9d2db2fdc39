use serde::{Deserialize, Serialize};

use crate::models::Phase;

/// Point-in-time view of the timer, rebuilt on every state change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub phase: Phase,
}

/// Internal timer state. Invariants: `remaining_secs <= total_secs`, and the
/// Idle phase always carries zeroed counters.
#[derive(Debug, Clone)]
pub struct TimerState {
    pub running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub phase: Phase,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            running: false,
            remaining_secs: 0,
            total_secs: 0,
            phase: Phase::Idle,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, duration_secs: u64, phase: Phase) {
        self.running = true;
        self.remaining_secs = duration_secs;
        self.total_secs = duration_secs;
        self.phase = phase;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            phase: self.phase,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (self.total_secs - self.remaining_secs) as f64 / self.total_secs as f64 * 100.0
    }
}
