use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use log::{error, info};
use tokio::{sync::broadcast, sync::Mutex, task::JoinHandle, time};

use crate::models::Phase;

use super::{TimerError, TimerEvent, TimerHooks, TimerSnapshot, TimerState};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Single-timer state machine. Ticks once per elapsed second from a spawned
/// task; at most one ticker task is outstanding, and `stop`/`pause`/`reset`
/// cancel it before returning.
#[derive(Clone)]
pub struct TimerEngine {
    state: Arc<Mutex<TimerState>>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    hooks: Arc<RwLock<Option<Arc<dyn TimerHooks>>>>,
    tick_interval: Duration,
}

impl TimerEngine {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            events,
            ticker: Arc::new(Mutex::new(None)),
            hooks: Arc::new(RwLock::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Register the lifecycle observer. At most one is active; registering
    /// replaces any previous observer.
    pub fn set_hooks(&self, hooks: Arc<dyn TimerHooks>) {
        *self.hooks.write().unwrap() = Some(hooks);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn progress_percent(&self) -> f64 {
        self.state.lock().await.progress_percent()
    }

    /// Begin a run. An already-active run is stopped first so that two runs
    /// can never overlap.
    pub async fn start(
        &self,
        duration_secs: u64,
        phase: Phase,
    ) -> Result<TimerSnapshot, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }

        if self.state.lock().await.running {
            self.stop().await;
        }

        let snapshot = {
            let mut state = self.state.lock().await;
            state.begin(duration_secs, phase);
            state.snapshot()
        };

        info!("Timer started: {} for {duration_secs}s", phase.as_str());
        self.emit(TimerEvent::Started {
            phase,
            duration: duration_secs,
        });

        // The first tick carries the full remaining time; decrements begin
        // one second later.
        if self.fire_tick(snapshot.clone()).await {
            self.spawn_ticker().await;
        }

        Ok(snapshot)
    }

    /// Halt ticking but keep remaining/total/phase so the run can resume.
    pub async fn stop(&self) -> TimerSnapshot {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.running = false;
            state.snapshot()
        };

        self.cancel_ticker().await;

        info!(
            "Timer stopped with {}s remaining",
            snapshot.remaining_secs
        );
        self.emit(TimerEvent::Stopped {
            snapshot: snapshot.clone(),
        });
        if let Some(hooks) = self.current_hooks() {
            hooks.on_stopped(&snapshot);
        }

        snapshot
    }

    /// Like `stop` but announced as a pause; a no-op unless running.
    pub async fn pause(&self) -> TimerSnapshot {
        let (was_running, snapshot) = {
            let mut state = self.state.lock().await;
            let was_running = state.running;
            state.running = false;
            (was_running, state.snapshot())
        };

        if !was_running {
            return snapshot;
        }

        self.cancel_ticker().await;

        info!("Timer paused with {}s remaining", snapshot.remaining_secs);
        self.emit(TimerEvent::Paused {
            snapshot: snapshot.clone(),
        });
        if let Some(hooks) = self.current_hooks() {
            hooks.on_paused(&snapshot);
        }

        snapshot
    }

    /// Restart a paused run with its preserved remaining time and phase.
    /// Returns `None` when there is nothing to resume.
    pub async fn resume(&self) -> Result<Option<TimerSnapshot>, TimerError> {
        let (running, remaining_secs, phase) = {
            let state = self.state.lock().await;
            (state.running, state.remaining_secs, state.phase)
        };

        if running || remaining_secs == 0 {
            return Ok(None);
        }

        self.start(remaining_secs, phase).await.map(Some)
    }

    /// Return to Idle with zeroed counters.
    pub async fn reset(&self) -> TimerSnapshot {
        if self.state.lock().await.running {
            self.stop().await;
        }

        let snapshot = {
            let mut state = self.state.lock().await;
            *state = TimerState::default();
            state.snapshot()
        };

        self.emit(TimerEvent::Reset);
        snapshot
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let engine = self.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The interval's first tick completes immediately; the start path
            // already emitted that one.
            interval.tick().await;

            loop {
                interval.tick().await;

                let snapshot = {
                    let mut state = engine.state.lock().await;
                    if !state.running {
                        break;
                    }
                    state.remaining_secs = state.remaining_secs.saturating_sub(1);
                    state.snapshot()
                };

                if !engine.fire_tick(snapshot.clone()).await {
                    break;
                }

                if snapshot.remaining_secs == 0 {
                    engine.finish(snapshot.phase).await;
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// Emit one tick and run the tick observer. A failing observer forces a
    /// stop and surfaces the failure as an `Error` event instead of tearing
    /// down the ticker task. Returns false when ticking must cease.
    async fn fire_tick(&self, snapshot: TimerSnapshot) -> bool {
        self.emit(TimerEvent::Tick {
            snapshot: snapshot.clone(),
        });

        let Some(hooks) = self.current_hooks() else {
            return true;
        };

        if let Err(err) = hooks.on_tick(&snapshot) {
            error!("Tick handler failed: {err:#}");

            let stopped = {
                let mut state = self.state.lock().await;
                state.running = false;
                state.snapshot()
            };
            self.emit(TimerEvent::Stopped {
                snapshot: stopped.clone(),
            });
            hooks.on_stopped(&stopped);
            self.emit(TimerEvent::Error {
                cause: format!("{err:#}"),
            });
            return false;
        }

        true
    }

    async fn finish(&self, phase: Phase) {
        {
            let mut state = self.state.lock().await;
            *state = TimerState::default();
        }

        info!("Timer finished: {}", phase.as_str());
        self.emit(TimerEvent::Finished {
            phase,
            was_successful: true,
        });
        if let Some(hooks) = self.current_hooks() {
            hooks.on_finished(phase, true);
        }
    }

    fn current_hooks(&self) -> Option<Arc<dyn TimerHooks>> {
        self.hooks.read().unwrap().clone()
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is fine; events are advisory for presentation code.
        let _ = self.events.send(event);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}
