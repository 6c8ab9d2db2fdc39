use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::models::{CodingActivity, SessionCodingStats};

use super::{ActivityFeed, EditEvent, IDLE_GAP_CUTOFF_SECS};

struct TrackerState {
    tracking: bool,
    activities: Vec<CodingActivity>,
    coding_time_secs: f64,
    last_edit_at: Option<DateTime<Utc>>,
}

impl TrackerState {
    fn reset(&mut self) {
        self.activities.clear();
        self.coding_time_secs = 0.0;
        self.last_edit_at = None;
    }
}

/// Reference [`ActivityFeed`] fed by discrete [`EditEvent`]s. Accumulates
/// one [`CodingActivity`] per distinct file touched during the window, in
/// first-edit order.
pub struct CodingTracker {
    inner: Mutex<TrackerState>,
}

impl CodingTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerState {
                tracking: false,
                activities: Vec::new(),
                coding_time_secs: 0.0,
                last_edit_at: None,
            }),
        }
    }

    /// Fold one editing fact into the open window. Ignored while no window
    /// is open.
    pub fn record_edit(&self, edit: EditEvent) {
        let mut state = self.inner.lock().unwrap();
        if !state.tracking {
            return;
        }

        // Gaps shorter than the idle cutoff count as active coding time;
        // anything longer means attention drifted away.
        if let Some(last) = state.last_edit_at {
            let gap = edit.at - last;
            if gap > Duration::zero() && gap.num_seconds() < IDLE_GAP_CUTOFF_SECS {
                state.coding_time_secs += gap.num_milliseconds() as f64 / 1000.0;
            }
        }
        state.last_edit_at = Some(edit.at);

        match state
            .activities
            .iter_mut()
            .find(|activity| activity.file_id == edit.file_id)
        {
            Some(activity) => {
                activity.lines_added += edit.lines_added;
                activity.lines_removed += edit.lines_removed;
                activity.lines_modified += edit.lines_modified;
                activity.characters_typed += edit.characters_typed;
                activity.keystrokes += edit.keystrokes;
                activity.last_edit_at = edit.at;
            }
            None => {
                state.activities.push(CodingActivity {
                    file_id: edit.file_id,
                    language: edit.language,
                    lines_added: edit.lines_added,
                    lines_removed: edit.lines_removed,
                    lines_modified: edit.lines_modified,
                    characters_typed: edit.characters_typed,
                    keystrokes: edit.keystrokes,
                    first_edit_at: edit.at,
                    last_edit_at: edit.at,
                });
            }
        }
    }
}

impl ActivityFeed for CodingTracker {
    fn start_tracking(&self) {
        let mut state = self.inner.lock().unwrap();
        if state.tracking {
            return;
        }
        state.tracking = true;
        state.reset();
        info!("Coding activity tracking started");
    }

    fn stop_tracking(&self) -> SessionCodingStats {
        let mut state = self.inner.lock().unwrap();
        if !state.tracking {
            return build_stats(&state);
        }
        state.tracking = false;
        let stats = build_stats(&state);
        info!(
            "Coding activity tracking stopped: {} files, {} keystrokes",
            stats.files_edited, stats.total_keystrokes
        );
        stats
    }

    fn current_stats(&self) -> SessionCodingStats {
        let state = self.inner.lock().unwrap();
        build_stats(&state)
    }
}

impl Default for CodingTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn build_stats(state: &TrackerState) -> SessionCodingStats {
    let mut stats = SessionCodingStats {
        files_edited: state.activities.len(),
        coding_time_secs: state.coding_time_secs,
        activities: state.activities.clone(),
        ..SessionCodingStats::default()
    };

    let mut best_score = 0.0_f64;

    for activity in &state.activities {
        stats.total_lines_added += activity.lines_added;
        stats.total_lines_removed += activity.lines_removed;
        stats.total_lines_modified += activity.lines_modified;
        stats.total_characters_typed += activity.characters_typed;
        stats.total_keystrokes += activity.keystrokes;

        if !stats.languages_used.contains(&activity.language) {
            stats.languages_used.push(activity.language.clone());
        }

        // Strictly-greater comparison keeps the first-seen file on ties.
        let score = activity.activity_score();
        if score > best_score {
            best_score = score;
            stats.most_active_file = Some(activity.file_id.clone());
        }
    }

    stats
}
