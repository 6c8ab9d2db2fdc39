use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{SessionRecord, SoundType};

/// One calendar day of aggregated session activity. Times are minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_focus_time: f64,
    pub total_break_time: f64,
    pub completed_sessions: usize,
    pub interrupted_sessions: usize,
    pub total_sessions: usize,
    /// Completed / total, as a percentage.
    pub productivity: f64,
    /// The global longest streak, repeated per day.
    pub longest_streak: u32,
    pub most_used_sound: Option<SoundType>,
    pub total_lines_added: u64,
    pub total_keystrokes: u64,
    pub files_edited: usize,
    pub languages_used: Vec<String>,
    /// Active coding time in minutes.
    pub active_coding_time: f64,
}

/// A Monday-aligned week of daily views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week_start: NaiveDate,
    pub daily_stats: Vec<DailyStats>,
    pub total_focus_time: f64,
    /// Total divided by seven; days without data count as zero.
    pub average_daily_focus: f64,
    pub best_day: NaiveDate,
    /// Days with at least one session out of seven, as a percentage.
    pub consistency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// YYYY-MM.
    pub month: String,
    pub weekly_stats: Vec<WeeklyStats>,
    pub total_focus_time: f64,
    pub average_weekly_focus: f64,
    /// Focus-time change versus the previous month, as a percentage.
    pub growth: f64,
    pub achievements: Vec<String>,
}

/// Lifetime aggregates over the full ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_sessions: usize,
    /// Hours.
    pub total_focus_time: f64,
    /// Hours.
    pub total_break_time: f64,
    /// Minutes.
    pub average_session_length: f64,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_days_used: usize,
    pub favorite_sound: Option<SoundType>,
    pub productivity: f64,
    /// One symbolic tree per four completed Focus sessions.
    pub trees_grown: u64,
    pub total_lines_of_code: u64,
    pub total_keystrokes: u64,
    pub total_files_edited: usize,
    pub favorite_language: Option<String>,
    pub average_lines_per_session: f64,
    /// Active coding seconds over focus seconds, as a percentage.
    pub coding_efficiency: f64,
}

/// Serializable dump of the ledger and every derived view, for
/// save-to-file features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub sessions: Vec<SessionRecord>,
    pub overall: OverallStats,
    pub daily: DailyStats,
    pub weekly: WeeklyStats,
    pub monthly: MonthlyStats,
}
