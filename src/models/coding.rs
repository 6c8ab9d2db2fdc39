use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-file accumulator for one tracking window. Created on the first edit
/// touching a file, updated on every subsequent edit to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingActivity {
    pub file_id: String,
    pub language: String,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub lines_modified: u64,
    pub characters_typed: u64,
    pub keystrokes: u64,
    pub first_edit_at: DateTime<Utc>,
    pub last_edit_at: DateTime<Utc>,
}

impl CodingActivity {
    /// Weighted activity score used to pick the most active file of a window.
    pub fn activity_score(&self) -> f64 {
        self.lines_added as f64 + self.lines_modified as f64 + self.keystrokes as f64 / 10.0
    }
}

/// Aggregate coding telemetry for one tracking window, attached to the
/// session record when a Focus session finalizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCodingStats {
    pub total_lines_added: u64,
    pub total_lines_removed: u64,
    pub total_lines_modified: u64,
    pub total_characters_typed: u64,
    pub total_keystrokes: u64,
    pub files_edited: usize,
    /// Languages in first-encountered order.
    pub languages_used: Vec<String>,
    pub most_active_file: Option<String>,
    /// Active coding time in seconds: sum of inter-edit gaps shorter than
    /// the idle cutoff.
    pub coding_time_secs: f64,
    pub activities: Vec<CodingActivity>,
}

impl Default for SessionCodingStats {
    fn default() -> Self {
        Self {
            total_lines_added: 0,
            total_lines_removed: 0,
            total_lines_modified: 0,
            total_characters_typed: 0,
            total_keystrokes: 0,
            files_edited: 0,
            languages_used: Vec::new(),
            most_active_file: None,
            coding_time_secs: 0.0,
            activities: Vec::new(),
        }
    }
}
