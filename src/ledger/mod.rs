use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{Phase, SessionCodingStats, SessionRecord, SoundType},
    store::Store,
};

/// Logical store key holding the append-only array of finalized sessions.
pub const SESSIONS_KEY: &str = "pinedoro.sessions";
/// Logical store key holding the single in-flight draft, if any.
pub const DRAFT_KEY: &str = "pinedoro.currentSession";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("a draft session is already open")]
    DraftAlreadyOpen,
    #[error("no draft session is open")]
    NoOpenDraft,
    #[error("session '{0}' is not the open draft")]
    UnknownSession(String),
}

struct LedgerState {
    sessions: Vec<SessionRecord>,
    draft: Option<SessionRecord>,
}

/// Append-only log of finalized sessions plus the single mutable draft.
/// Insertion order is chronological and records are never mutated or
/// reordered after append; every statistic is recomputed from this log.
pub struct SessionLedger {
    store: Arc<dyn Store>,
    inner: RwLock<LedgerState>,
}

impl SessionLedger {
    /// Load the ledger from the store. A draft left behind by a crashed
    /// process is finalized as interrupted rather than silently dropped.
    pub fn new(store: Arc<dyn Store>) -> Result<Self> {
        let mut sessions: Vec<SessionRecord> = match store
            .get(SESSIONS_KEY)
            .context("failed to read session log")?
        {
            Some(value) if !value.is_null() => serde_json::from_value(value)
                .context("session log is corrupt")?,
            _ => Vec::new(),
        };

        if let Some(value) = store
            .get(DRAFT_KEY)
            .context("failed to read draft session")?
        {
            if !value.is_null() {
                let mut draft: SessionRecord =
                    serde_json::from_value(value).context("draft session is corrupt")?;
                warn!(
                    "Recovered incomplete session {}; finalizing as interrupted",
                    draft.id
                );
                draft.interrupted = true;
                draft.interruption_count += 1;
                sessions.push(draft);
                store.set(SESSIONS_KEY, serde_json::to_value(&sessions)?)?;
                store.remove(DRAFT_KEY)?;
            }
        }

        Ok(Self {
            store,
            inner: RwLock::new(LedgerState {
                sessions,
                draft: None,
            }),
        })
    }

    /// Open a new draft. Fails with [`LedgerError::DraftAlreadyOpen`] if one
    /// exists; callers must finalize first.
    pub fn open_session(
        &self,
        phase: Phase,
        planned_duration_secs: u64,
        sound: Option<SoundType>,
        project_name: Option<String>,
    ) -> Result<String> {
        let mut inner = self.inner.write().unwrap();
        if inner.draft.is_some() {
            return Err(LedgerError::DraftAlreadyOpen.into());
        }

        let now = Utc::now();
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            phase,
            planned_duration_secs,
            actual_duration_secs: 0,
            started_at: now,
            ended_at: now,
            completed: false,
            interrupted: false,
            interruption_count: 0,
            sound_used: sound,
            project_name,
            coding_stats: None,
        };

        // Persist first so an unwritable store never leaves a phantom draft
        // in memory.
        self.store
            .set(DRAFT_KEY, serde_json::to_value(&record)?)
            .context("failed to persist draft session")?;

        info!(
            "Session {} opened: {} for {planned_duration_secs}s",
            record.id,
            phase.as_str()
        );
        let id = record.id.clone();
        inner.draft = Some(record);
        Ok(id)
    }

    /// Refresh the draft's elapsed time. Called once per timer tick.
    pub fn update_actual_duration(&self, session_id: &str, seconds: u64) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let draft = expect_draft(&mut inner, session_id)?;
        draft.actual_duration_secs = seconds;
        draft.ended_at = Utc::now();
        let value = serde_json::to_value(&*draft)?;
        self.store
            .set(DRAFT_KEY, value)
            .context("failed to persist draft progress")
    }

    /// Bump the draft's interruption counter without finalizing, so repeated
    /// pauses of the same run accumulate.
    pub fn record_interruption(&self, session_id: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let draft = expect_draft(&mut inner, session_id)?;
        draft.interruption_count += 1;
        let value = serde_json::to_value(&*draft)?;
        self.store
            .set(DRAFT_KEY, value)
            .context("failed to persist draft interruption")
    }

    pub fn complete_session(
        &self,
        session_id: &str,
        coding_stats: Option<SessionCodingStats>,
    ) -> Result<SessionRecord> {
        self.finalize(session_id, true, coding_stats)
    }

    pub fn interrupt_session(
        &self,
        session_id: &str,
        coding_stats: Option<SessionCodingStats>,
    ) -> Result<SessionRecord> {
        self.finalize(session_id, false, coding_stats)
    }

    fn finalize(
        &self,
        session_id: &str,
        completed: bool,
        coding_stats: Option<SessionCodingStats>,
    ) -> Result<SessionRecord> {
        let mut inner = self.inner.write().unwrap();
        let mut record = expect_draft(&mut inner, session_id)?.clone();

        record.ended_at = Utc::now();
        if completed {
            record.completed = true;
        } else {
            record.interrupted = true;
            record.interruption_count += 1;
        }
        if coding_stats.is_some() {
            record.coding_stats = coding_stats;
        }

        // Store writes go first; a failure leaves the draft open and
        // retryable instead of half-finalized.
        let mut sessions = inner.sessions.clone();
        sessions.push(record.clone());
        self.store
            .set(SESSIONS_KEY, serde_json::to_value(&sessions)?)
            .context("failed to persist session log")?;
        self.store
            .remove(DRAFT_KEY)
            .context("failed to clear draft session")?;

        info!(
            "Session {} finalized as {}",
            record.id,
            if completed { "completed" } else { "interrupted" }
        );
        inner.sessions = sessions;
        inner.draft = None;
        Ok(record)
    }

    pub fn get_all_sessions(&self) -> Vec<SessionRecord> {
        self.inner.read().unwrap().sessions.clone()
    }

    pub fn current_draft(&self) -> Option<SessionRecord> {
        self.inner.read().unwrap().draft.clone()
    }

    pub fn has_open_draft(&self) -> bool {
        self.inner.read().unwrap().draft.is_some()
    }

    /// Wipe the session log and any draft.
    pub fn clear_all(&self) -> Result<()> {
        self.store.set(SESSIONS_KEY, json!([]))?;
        self.store.remove(DRAFT_KEY)?;
        let mut inner = self.inner.write().unwrap();
        inner.sessions.clear();
        inner.draft = None;
        Ok(())
    }
}

fn expect_draft<'a>(
    inner: &'a mut LedgerState,
    session_id: &str,
) -> Result<&'a mut SessionRecord> {
    match inner.draft.as_mut() {
        None => Err(LedgerError::NoOpenDraft.into()),
        Some(draft) if draft.id != session_id => {
            Err(LedgerError::UnknownSession(session_id.to_string()).into())
        }
        Some(draft) => Ok(draft),
    }
}

#[cfg(test)]
mod tests;
