use serde::Serialize;

use crate::models::Phase;

use super::TimerSnapshot;

/// Lifecycle events broadcast to UI-facing consumers. Ordering guarantees:
/// `Started` precedes the first `Tick` of a run, and `Finished` precedes any
/// subsequent `Started`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    Started { phase: Phase, duration: u64 },
    Tick { snapshot: TimerSnapshot },
    Paused { snapshot: TimerSnapshot },
    Stopped { snapshot: TimerSnapshot },
    Reset,
    Finished { phase: Phase, was_successful: bool },
    Error { cause: String },
}

/// Observer invoked synchronously inside engine transitions, in event order.
/// This is the orchestrator's wiring point; the broadcast stream stays
/// fire-and-forget for presentation consumers.
///
/// `on_tick` is fallible: an error here forces a stop and is surfaced as a
/// [`TimerEvent::Error`] rather than unwinding the ticker.
pub trait TimerHooks: Send + Sync {
    fn on_tick(&self, _snapshot: &TimerSnapshot) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_paused(&self, _snapshot: &TimerSnapshot) {}

    fn on_stopped(&self, _snapshot: &TimerSnapshot) {}

    fn on_finished(&self, _phase: Phase, _was_successful: bool) {}
}
