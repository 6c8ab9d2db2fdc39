use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::error;
use tokio::sync::broadcast;

use crate::{
    ledger::SessionLedger,
    models::{Phase, SessionCodingStats, SoundType},
    stats::{self, DailyStats, ExportSnapshot, MonthlyStats, OverallStats, WeeklyStats},
    timer::{TimerEngine, TimerError, TimerEvent, TimerHooks, TimerSnapshot},
    tracking::ActivityFeed,
};

pub const FOCUS_DURATION_SECS: u64 = 25 * 60;
pub const SHORT_BREAK_DURATION_SECS: u64 = 5 * 60;
pub const LONG_BREAK_DURATION_SECS: u64 = 15 * 60;

/// Timer-lifecycle observer that turns engine transitions into ledger
/// writes. Runs inside engine operations, so draft finalization always lands
/// before the next run can begin.
struct LedgerHooks {
    ledger: Arc<SessionLedger>,
    feed: Arc<dyn ActivityFeed>,
}

impl LedgerHooks {
    fn close_tracking_window(&self, phase: Phase) -> Option<SessionCodingStats> {
        (phase == Phase::Focus).then(|| self.feed.stop_tracking())
    }
}

impl TimerHooks for LedgerHooks {
    fn on_tick(&self, snapshot: &TimerSnapshot) -> Result<()> {
        let Some(draft) = self.ledger.current_draft() else {
            return Ok(());
        };
        let elapsed = snapshot.total_secs - snapshot.remaining_secs;
        self.ledger.update_actual_duration(&draft.id, elapsed)
    }

    fn on_paused(&self, _snapshot: &TimerSnapshot) {
        if let Some(draft) = self.ledger.current_draft() {
            if let Err(err) = self.ledger.record_interruption(&draft.id) {
                error!("Failed to record interruption for {}: {err:#}", draft.id);
            }
        }
    }

    fn on_stopped(&self, _snapshot: &TimerSnapshot) {
        if let Some(draft) = self.ledger.current_draft() {
            let coding = self.close_tracking_window(draft.phase);
            if let Err(err) = self.ledger.interrupt_session(&draft.id, coding) {
                error!("Failed to interrupt session {}: {err:#}", draft.id);
            }
        }
    }

    fn on_finished(&self, _phase: Phase, was_successful: bool) {
        let Some(draft) = self.ledger.current_draft() else {
            return;
        };
        let coding = self.close_tracking_window(draft.phase);
        let result = if was_successful {
            self.ledger.complete_session(&draft.id, coding)
        } else {
            self.ledger.interrupt_session(&draft.id, coding)
        };
        if let Err(err) = result {
            error!("Failed to finalize session {}: {err:#}", draft.id);
        }
    }
}

/// Wires the timer engine, the session ledger, and the coding-activity feed
/// together: one draft per run, one tracking window per Focus session, and a
/// finalized ledger entry for every run that started.
pub struct SessionOrchestrator {
    engine: TimerEngine,
    ledger: Arc<SessionLedger>,
    feed: Arc<dyn ActivityFeed>,
    project_name: Option<String>,
}

impl SessionOrchestrator {
    pub fn new(ledger: Arc<SessionLedger>, feed: Arc<dyn ActivityFeed>) -> Self {
        let engine = TimerEngine::new();
        engine.set_hooks(Arc::new(LedgerHooks {
            ledger: ledger.clone(),
            feed: feed.clone(),
        }));

        Self {
            engine,
            ledger,
            feed,
            project_name: None,
        }
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Begin a run, finalizing whatever was in flight first so drafts can
    /// never overlap.
    pub async fn start_session(
        &self,
        phase: Phase,
        duration_secs: u64,
        sound: Option<SoundType>,
    ) -> Result<String> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration.into());
        }

        if self.engine.snapshot().await.running {
            // The stop hook interrupts and appends the open draft.
            self.engine.stop().await;
        } else if let Some(draft) = self.ledger.current_draft() {
            // A paused run leaves its draft open; close it before the next.
            let coding = (draft.phase == Phase::Focus).then(|| self.feed.stop_tracking());
            self.ledger.interrupt_session(&draft.id, coding)?;
        }

        let session_id = self.ledger.open_session(
            phase,
            duration_secs,
            sound,
            self.project_name.clone(),
        )?;
        if phase == Phase::Focus {
            self.feed.start_tracking();
        }

        match self.engine.start(duration_secs, phase).await {
            Ok(_) => Ok(session_id),
            Err(err) => {
                // Keep the ledger consistent if the engine rejects the run.
                let coding = (phase == Phase::Focus).then(|| self.feed.stop_tracking());
                let _ = self.ledger.interrupt_session(&session_id, coding);
                Err(err.into())
            }
        }
    }

    pub async fn start_focus(&self, sound: Option<SoundType>) -> Result<String> {
        self.start_session(Phase::Focus, FOCUS_DURATION_SECS, sound).await
    }

    pub async fn start_short_break(&self, sound: Option<SoundType>) -> Result<String> {
        self.start_session(Phase::ShortBreak, SHORT_BREAK_DURATION_SECS, sound)
            .await
    }

    pub async fn start_long_break(&self, sound: Option<SoundType>) -> Result<String> {
        self.start_session(Phase::LongBreak, LONG_BREAK_DURATION_SECS, sound)
            .await
    }

    /// Every fourth completed Focus session earns the long break.
    pub fn next_break_phase(&self) -> Phase {
        let completed_focus = self
            .ledger
            .get_all_sessions()
            .iter()
            .filter(|s| s.completed && s.phase == Phase::Focus)
            .count();
        if completed_focus > 0 && completed_focus % 4 == 0 {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        }
    }

    pub async fn stop(&self) -> TimerSnapshot {
        self.engine.stop().await
    }

    pub async fn pause(&self) -> TimerSnapshot {
        self.engine.pause().await
    }

    pub async fn resume(&self) -> Result<Option<TimerSnapshot>> {
        Ok(self.engine.resume().await?)
    }

    /// Clear the timer and finalize any draft a paused run left behind.
    pub async fn reset(&self) -> Result<TimerSnapshot> {
        let snapshot = self.engine.reset().await;
        if let Some(draft) = self.ledger.current_draft() {
            let coding = (draft.phase == Phase::Focus).then(|| self.feed.stop_tracking());
            self.ledger.interrupt_session(&draft.id, coding)?;
        }
        Ok(snapshot)
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.engine.snapshot().await
    }

    pub async fn progress_percent(&self) -> f64 {
        self.engine.progress_percent().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.engine.subscribe()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Live coding snapshot of the open tracking window.
    pub fn current_coding_stats(&self) -> SessionCodingStats {
        self.feed.current_stats()
    }

    pub fn daily_stats(&self, date: NaiveDate) -> DailyStats {
        stats::daily_stats(&self.ledger.get_all_sessions(), date)
    }

    pub fn weekly_stats(&self, week_start: NaiveDate) -> WeeklyStats {
        stats::weekly_stats(&self.ledger.get_all_sessions(), week_start)
    }

    pub fn monthly_stats(&self, month_of: NaiveDate) -> MonthlyStats {
        stats::monthly_stats(&self.ledger.get_all_sessions(), month_of)
    }

    pub fn overall_stats(&self) -> OverallStats {
        stats::overall_stats(&self.ledger.get_all_sessions(), today())
    }

    pub fn export_all_data(&self) -> ExportSnapshot {
        stats::export_all_data(&self.ledger.get_all_sessions(), today())
    }

    pub fn clear_history(&self) -> Result<()> {
        self.ledger.clear_all()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
