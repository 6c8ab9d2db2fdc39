use std::sync::{Arc, Mutex};

use anyhow::bail;

use crate::models::Phase;

use super::{TimerEngine, TimerError, TimerEvent, TimerHooks, TimerSnapshot};

#[derive(Default)]
struct RecordingHooks {
    log: Mutex<Vec<String>>,
}

impl RecordingHooks {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl TimerHooks for RecordingHooks {
    fn on_tick(&self, snapshot: &TimerSnapshot) -> anyhow::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("tick {}", snapshot.remaining_secs));
        Ok(())
    }

    fn on_paused(&self, snapshot: &TimerSnapshot) {
        self.log
            .lock()
            .unwrap()
            .push(format!("paused {}", snapshot.remaining_secs));
    }

    fn on_stopped(&self, snapshot: &TimerSnapshot) {
        self.log
            .lock()
            .unwrap()
            .push(format!("stopped {}", snapshot.remaining_secs));
    }

    fn on_finished(&self, phase: Phase, was_successful: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("finished {} {was_successful}", phase.as_str()));
    }
}

struct FailingHooks;

impl TimerHooks for FailingHooks {
    fn on_tick(&self, _snapshot: &TimerSnapshot) -> anyhow::Result<()> {
        bail!("storage offline")
    }
}

#[tokio::test]
async fn zero_duration_is_rejected() {
    let engine = TimerEngine::new();
    let result = engine.start(0, Phase::Focus).await;
    assert_eq!(result.unwrap_err(), TimerError::InvalidDuration);
    assert!(!engine.snapshot().await.running);
}

#[tokio::test(start_paused = true)]
async fn run_ticks_down_and_finishes_exactly_once() {
    let engine = TimerEngine::new();
    let mut events = engine.subscribe();

    engine.start(3, Phase::Focus).await.unwrap();

    match events.recv().await.unwrap() {
        TimerEvent::Started { phase, duration } => {
            assert_eq!(phase, Phase::Focus);
            assert_eq!(duration, 3);
        }
        other => panic!("expected Started, got {other:?}"),
    }

    // The first tick is immediate and carries the full remaining time.
    match events.recv().await.unwrap() {
        TimerEvent::Tick { snapshot } => {
            assert!(snapshot.running);
            assert_eq!(snapshot.remaining_secs, 3);
            assert_eq!(snapshot.total_secs, 3);
        }
        other => panic!("expected Tick, got {other:?}"),
    }

    let mut remaining = Vec::new();
    loop {
        match events.recv().await.unwrap() {
            TimerEvent::Tick { snapshot } => remaining.push(snapshot.remaining_secs),
            TimerEvent::Finished {
                phase,
                was_successful,
            } => {
                assert_eq!(phase, Phase::Focus);
                assert!(was_successful);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(remaining, vec![2, 1, 0]);

    // Natural completion returns the engine to Idle with zeroed counters.
    let snapshot = engine.snapshot().await;
    assert!(!snapshot.running);
    assert_eq!(snapshot.remaining_secs, 0);
    assert_eq!(snapshot.total_secs, 0);
    assert_eq!(snapshot.phase, Phase::Idle);

    // No trailing Finished or Stopped after the run ended.
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn pause_preserves_remaining_and_resume_continues() {
    let engine = TimerEngine::new();
    let mut events = engine.subscribe();

    engine.start(10, Phase::ShortBreak).await.unwrap();

    // Started plus the immediate tick, then two elapsed seconds.
    for _ in 0..2 {
        events.recv().await.unwrap();
    }
    let mut last_remaining = 10;
    while last_remaining > 8 {
        if let TimerEvent::Tick { snapshot } = events.recv().await.unwrap() {
            last_remaining = snapshot.remaining_secs;
        }
    }

    let paused = engine.pause().await;
    assert!(!paused.running);
    assert_eq!(paused.remaining_secs, 8);
    assert_eq!(paused.phase, Phase::ShortBreak);

    // Pausing an already-paused engine changes nothing.
    let again = engine.pause().await;
    assert_eq!(again, paused);

    let resumed = engine.resume().await.unwrap().unwrap();
    assert!(resumed.running);
    assert_eq!(resumed.remaining_secs, 8);
    assert_eq!(resumed.phase, Phase::ShortBreak);
}

#[tokio::test(start_paused = true)]
async fn resume_without_a_paused_run_is_a_no_op() {
    let engine = TimerEngine::new();
    assert_eq!(engine.resume().await.unwrap(), None);

    engine.start(5, Phase::Focus).await.unwrap();
    // Already running; nothing to resume.
    assert_eq!(engine.resume().await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn stop_keeps_counters_and_reset_clears_them() {
    let engine = TimerEngine::new();
    engine.start(60, Phase::Focus).await.unwrap();

    let stopped = engine.stop().await;
    assert!(!stopped.running);
    assert_eq!(stopped.remaining_secs, 60);
    assert_eq!(stopped.phase, Phase::Focus);

    let reset = engine.reset().await;
    assert!(!reset.running);
    assert_eq!(reset.remaining_secs, 0);
    assert_eq!(reset.total_secs, 0);
    assert_eq!(reset.phase, Phase::Idle);

    // Resetting an idle engine is a no-op.
    assert_eq!(engine.reset().await, reset);
}

#[tokio::test(start_paused = true)]
async fn starting_while_running_stops_the_previous_run_first() {
    let engine = TimerEngine::new();
    let hooks = Arc::new(RecordingHooks::default());
    engine.set_hooks(hooks.clone());

    engine.start(30, Phase::Focus).await.unwrap();
    engine.start(5, Phase::ShortBreak).await.unwrap();

    let entries = hooks.entries();
    assert_eq!(entries, vec!["tick 30", "stopped 30", "tick 5"]);

    let snapshot = engine.snapshot().await;
    assert!(snapshot.running);
    assert_eq!(snapshot.phase, Phase::ShortBreak);
}

#[tokio::test(start_paused = true)]
async fn hooks_observe_the_full_lifecycle_in_order() {
    let engine = TimerEngine::new();
    let hooks = Arc::new(RecordingHooks::default());
    engine.set_hooks(hooks.clone());

    engine.start(1, Phase::Focus).await.unwrap();

    let mut events = engine.subscribe();
    // Drain until the run ends; hooks fire synchronously inside the engine.
    loop {
        match events.recv().await {
            Ok(TimerEvent::Finished { .. }) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Give the aborted ticker task no chance to have left extra entries.
    assert_eq!(
        hooks.entries(),
        vec!["tick 1", "tick 0", "finished Focus true"]
    );
}

#[tokio::test(start_paused = true)]
async fn failing_tick_hook_stops_the_run_and_surfaces_an_error() {
    let engine = TimerEngine::new();
    engine.set_hooks(Arc::new(FailingHooks));
    let mut events = engine.subscribe();

    // The immediate tick fails, so the run halts before a ticker spawns.
    engine.start(10, Phase::Focus).await.unwrap();

    let mut saw_stopped = false;
    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        match event {
            TimerEvent::Stopped { snapshot } => {
                assert!(!snapshot.running);
                saw_stopped = true;
            }
            TimerEvent::Error { cause } => {
                assert!(cause.contains("storage offline"));
                saw_error = true;
            }
            TimerEvent::Started { .. } | TimerEvent::Tick { .. } => {}
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(saw_stopped);
    assert!(saw_error);
    assert!(!engine.snapshot().await.running);
}
