use std::sync::Arc;

use chrono::Utc;

use crate::{
    models::{Phase, SessionCodingStats, SessionRecord, SoundType},
    store::{MemoryStore, SqliteStore, Store},
};

use super::{LedgerError, SessionLedger, DRAFT_KEY, SESSIONS_KEY};

fn ledger_over(store: Arc<dyn Store>) -> SessionLedger {
    SessionLedger::new(store).unwrap()
}

#[test]
fn finalized_sessions_append_in_order() {
    let ledger = ledger_over(Arc::new(MemoryStore::new()));

    let first = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap();
    ledger.complete_session(&first, None).unwrap();

    let second = ledger
        .open_session(Phase::ShortBreak, 300, None, None)
        .unwrap();
    ledger.interrupt_session(&second, None).unwrap();

    let sessions = ledger.get_all_sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, first);
    assert!(sessions[0].completed);
    assert!(!sessions[0].interrupted);
    assert_eq!(sessions[1].id, second);
    assert!(sessions[1].interrupted);
    assert!(sessions[1].started_at <= sessions[1].ended_at);
}

#[test]
fn only_one_draft_may_be_open() {
    let ledger = ledger_over(Arc::new(MemoryStore::new()));

    let id = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap();
    let err = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::DraftAlreadyOpen)
    );

    ledger.complete_session(&id, None).unwrap();
    assert!(!ledger.has_open_draft());
    ledger
        .open_session(Phase::ShortBreak, 300, None, None)
        .unwrap();
}

#[test]
fn draft_updates_require_the_open_draft() {
    let ledger = ledger_over(Arc::new(MemoryStore::new()));

    let err = ledger.update_actual_duration("nope", 10).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::NoOpenDraft)
    );

    let id = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap();
    let err = ledger.update_actual_duration("other-id", 10).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::UnknownSession("other-id".to_string()))
    );

    ledger.update_actual_duration(&id, 42).unwrap();
    assert_eq!(ledger.current_draft().unwrap().actual_duration_secs, 42);
}

#[test]
fn interruptions_accumulate_across_pause_and_final_stop() {
    let ledger = ledger_over(Arc::new(MemoryStore::new()));

    let id = ledger
        .open_session(Phase::Focus, 1500, Some(SoundType::Lofi), None)
        .unwrap();
    // Two pauses of the same run.
    ledger.record_interruption(&id).unwrap();
    ledger.record_interruption(&id).unwrap();
    // The final stop adds one more.
    let record = ledger.interrupt_session(&id, None).unwrap();

    assert!(record.interrupted);
    assert!(!record.completed);
    assert_eq!(record.interruption_count, 3);
    assert_eq!(record.sound_used, Some(SoundType::Lofi));
}

#[test]
fn completion_does_not_bump_the_interruption_count() {
    let ledger = ledger_over(Arc::new(MemoryStore::new()));

    let id = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap();
    ledger.record_interruption(&id).unwrap();
    let record = ledger
        .complete_session(&id, Some(SessionCodingStats::default()))
        .unwrap();

    assert!(record.completed);
    assert!(!record.interrupted);
    assert_eq!(record.interruption_count, 1);
    assert!(record.coding_stats.is_some());
}

#[test]
fn orphaned_draft_is_recovered_as_interrupted() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let now = Utc::now();
    let orphan = SessionRecord {
        id: "orphan".to_string(),
        phase: Phase::Focus,
        planned_duration_secs: 1500,
        actual_duration_secs: 600,
        started_at: now,
        ended_at: now,
        completed: false,
        interrupted: false,
        interruption_count: 1,
        sound_used: None,
        project_name: None,
        coding_stats: None,
    };
    store
        .set(DRAFT_KEY, serde_json::to_value(&orphan).unwrap())
        .unwrap();

    let ledger = ledger_over(store.clone());
    let sessions = ledger.get_all_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, "orphan");
    assert!(sessions[0].interrupted);
    assert_eq!(sessions[0].interruption_count, 2);
    assert!(!ledger.has_open_draft());

    // The draft key is gone and the log is durable.
    assert!(store.get(DRAFT_KEY).unwrap().is_none());
    let persisted = store.get(SESSIONS_KEY).unwrap().unwrap();
    assert_eq!(persisted.as_array().unwrap().len(), 1);
}

#[test]
fn clear_all_wipes_log_and_draft() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let ledger = ledger_over(store.clone());

    let id = ledger
        .open_session(Phase::Focus, 1500, None, None)
        .unwrap();
    ledger.complete_session(&id, None).unwrap();
    ledger
        .open_session(Phase::ShortBreak, 300, None, None)
        .unwrap();

    ledger.clear_all().unwrap();
    assert!(ledger.get_all_sessions().is_empty());
    assert!(!ledger.has_open_draft());
    assert!(store.get(DRAFT_KEY).unwrap().is_none());
}

#[test]
fn sqlite_backed_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.db");

    {
        let store = Arc::new(SqliteStore::new(path.clone()).unwrap());
        let ledger = ledger_over(store);
        let id = ledger
            .open_session(Phase::Focus, 1500, None, Some("pinedoro".to_string()))
            .unwrap();
        ledger.update_actual_duration(&id, 900).unwrap();
        ledger.complete_session(&id, None).unwrap();
    }

    let store = Arc::new(SqliteStore::new(path).unwrap());
    let ledger = ledger_over(store);
    let sessions = ledger.get_all_sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].actual_duration_secs, 900);
    assert_eq!(sessions[0].project_name.as_deref(), Some("pinedoro"));
}
