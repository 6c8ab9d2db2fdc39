//! Pure aggregation over a ledger snapshot. Every view is recomputed from
//! the session log on demand; nothing here keeps state between calls.

mod types;

pub use types::{DailyStats, ExportSnapshot, MonthlyStats, OverallStats, WeeklyStats};

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Phase, SessionRecord, SoundType};

/// Completed Focus sessions per symbolic tree.
pub const SESSIONS_PER_TREE: u64 = 4;

const CENTURY_FOCUS_MINUTES: f64 = 100.0 * 60.0;
const WEEKLY_WARRIOR_MINUTES: f64 = 20.0 * 60.0;
const CONSISTENT_GROWER_PERCENT: f64 = 80.0;

type Grouped<'a> = HashMap<NaiveDate, Vec<&'a SessionRecord>>;

/// Aggregates for one calendar day, matched by session start date.
pub fn daily_stats(sessions: &[SessionRecord], date: NaiveDate) -> DailyStats {
    let grouped = group_by_date(sessions);
    calc_daily(date, &grouped, longest_streak(sessions))
}

/// Aggregates for the seven days beginning at `week_start` (a Monday).
pub fn weekly_stats(sessions: &[SessionRecord], week_start: NaiveDate) -> WeeklyStats {
    let grouped = group_by_date(sessions);
    calc_weekly(week_start, &grouped, longest_streak(sessions))
}

/// Aggregates for the month containing `month_of`, partitioned into
/// Monday-aligned weeks starting from the week holding the 1st.
pub fn monthly_stats(sessions: &[SessionRecord], month_of: NaiveDate) -> MonthlyStats {
    let grouped = group_by_date(sessions);
    let longest = longest_streak(sessions);

    let first = first_of_month(month_of);
    let weeks = weeks_in_month(first);
    let weekly: Vec<WeeklyStats> = weeks
        .iter()
        .map(|&week| calc_weekly(week, &grouped, longest))
        .collect();

    let total_focus_time: f64 = weekly.iter().map(|week| week.total_focus_time).sum();
    let average_weekly_focus = if weekly.is_empty() {
        0.0
    } else {
        total_focus_time / weekly.len() as f64
    };

    // Growth compares plain week-sum totals; it never re-enters the monthly
    // aggregation.
    let prev_first = first_of_month(first - Duration::days(1));
    let prev_total: f64 = weeks_in_month(prev_first)
        .iter()
        .map(|&week| week_focus_minutes(week, &grouped))
        .sum();
    let growth = if prev_total > 0.0 {
        (total_focus_time - prev_total) / prev_total * 100.0
    } else {
        0.0
    };

    let mut achievements = Vec::new();
    if total_focus_time >= CENTURY_FOCUS_MINUTES {
        achievements.push("Century Focus - 100+ hours".to_string());
    }
    if weekly
        .first()
        .is_some_and(|week| week.consistency > CONSISTENT_GROWER_PERCENT)
    {
        achievements.push("Consistent Grower - 80%+ consistency".to_string());
    }
    if average_weekly_focus >= WEEKLY_WARRIOR_MINUTES {
        achievements.push("Weekly Warrior - 20+ hours/week".to_string());
    }

    MonthlyStats {
        month: format!("{:04}-{:02}", first.year(), first.month()),
        weekly_stats: weekly,
        total_focus_time,
        average_weekly_focus,
        growth,
        achievements,
    }
}

/// Lifetime aggregates. `today` anchors the current-streak walk.
pub fn overall_stats(sessions: &[SessionRecord], today: NaiveDate) -> OverallStats {
    let completed_count = sessions.iter().filter(|s| s.completed).count();
    let focus: Vec<&SessionRecord> = sessions
        .iter()
        .filter(|s| s.phase == Phase::Focus)
        .collect();
    let focus_with_coding: Vec<&SessionRecord> = focus
        .iter()
        .copied()
        .filter(|s| s.coding_stats.is_some())
        .collect();

    let total_focus_minutes: f64 = focus
        .iter()
        .map(|s| s.actual_duration_secs as f64 / 60.0)
        .sum();
    let total_break_minutes: f64 = sessions
        .iter()
        .filter(|s| s.phase.is_break())
        .map(|s| s.actual_duration_secs as f64 / 60.0)
        .sum();

    let mut total_lines_of_code = 0u64;
    let mut total_keystrokes = 0u64;
    let mut total_coding_secs = 0.0f64;
    let mut files_edited: HashSet<&str> = HashSet::new();
    let mut language_counts: Vec<(&str, u64)> = Vec::new();

    for session in &focus_with_coding {
        let Some(coding) = session.coding_stats.as_ref() else {
            continue;
        };
        total_lines_of_code += coding.total_lines_added;
        total_keystrokes += coding.total_keystrokes;
        total_coding_secs += coding.coding_time_secs;
        for activity in &coding.activities {
            files_edited.insert(activity.file_id.as_str());
        }
        // Language popularity counts once per session, not per edit.
        for language in &coding.languages_used {
            match language_counts
                .iter_mut()
                .find(|(name, _)| *name == language.as_str())
            {
                Some((_, count)) => *count += 1,
                None => language_counts.push((language.as_str(), 1)),
            }
        }
    }

    let favorite_language = pick_mode(&language_counts).map(str::to_string);

    let total_days_used = sessions
        .iter()
        .map(session_date)
        .collect::<HashSet<_>>()
        .len();

    let completed_focus = focus.iter().filter(|s| s.completed).count() as u64;

    let total_actual_minutes: f64 = sessions
        .iter()
        .map(|s| s.actual_duration_secs as f64 / 60.0)
        .sum();
    let average_session_length = if sessions.is_empty() {
        0.0
    } else {
        total_actual_minutes / sessions.len() as f64
    };

    let completion_rate = ratio_percent(completed_count as f64, sessions.len() as f64);

    OverallStats {
        total_sessions: sessions.len(),
        total_focus_time: total_focus_minutes / 60.0,
        total_break_time: total_break_minutes / 60.0,
        average_session_length,
        completion_rate,
        current_streak: current_streak(sessions, today),
        longest_streak: longest_streak(sessions),
        total_days_used,
        favorite_sound: most_used_sound(sessions.iter()),
        productivity: completion_rate,
        trees_grown: completed_focus / SESSIONS_PER_TREE,
        total_lines_of_code,
        total_keystrokes,
        total_files_edited: files_edited.len(),
        favorite_language,
        average_lines_per_session: if focus_with_coding.is_empty() {
            0.0
        } else {
            total_lines_of_code as f64 / focus_with_coding.len() as f64
        },
        coding_efficiency: ratio_percent(total_coding_secs, total_focus_minutes * 60.0),
    }
}

/// Full serializable dump: the raw ledger plus today's daily, the current
/// week, the current month, and the overall view.
pub fn export_all_data(sessions: &[SessionRecord], today: NaiveDate) -> ExportSnapshot {
    ExportSnapshot {
        sessions: sessions.to_vec(),
        overall: overall_stats(sessions, today),
        daily: daily_stats(sessions, today),
        weekly: weekly_stats(sessions, week_start_for(today)),
        monthly: monthly_stats(sessions, today),
    }
}

/// Consecutive calendar days ending at `today` that each carry at least one
/// completed session.
pub fn current_streak(sessions: &[SessionRecord], today: NaiveDate) -> u32 {
    let completed_dates: HashSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.completed)
        .map(session_date)
        .collect();

    let mut streak = 0;
    let mut day = today;
    while completed_dates.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive calendar days each carrying at least one
/// completed session, over the whole ledger.
pub fn longest_streak(sessions: &[SessionRecord]) -> u32 {
    let completed_dates: BTreeSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.completed)
        .map(session_date)
        .collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in completed_dates {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

/// Monday of the week containing `date`.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn session_date(session: &SessionRecord) -> NaiveDate {
    session.started_at.date_naive()
}

fn group_by_date(sessions: &[SessionRecord]) -> Grouped<'_> {
    let mut grouped: Grouped<'_> = HashMap::new();
    for session in sessions {
        grouped.entry(session_date(session)).or_default().push(session);
    }
    grouped
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Monday-aligned week starts covering a month, beginning with the week that
/// holds the 1st and stepping while the start is on or before the last day.
fn weeks_in_month(first: NaiveDate) -> Vec<NaiveDate> {
    let next_first = first_of_month(first + Duration::days(32));
    let last = next_first - Duration::days(1);

    let mut weeks = Vec::new();
    let mut monday = week_start_for(first);
    while monday <= last {
        weeks.push(monday);
        monday += Duration::days(7);
    }
    weeks
}

fn calc_daily(date: NaiveDate, grouped: &Grouped<'_>, longest_streak: u32) -> DailyStats {
    let empty = Vec::new();
    let day_sessions = grouped.get(&date).unwrap_or(&empty);

    let total_focus_time: f64 = day_sessions
        .iter()
        .filter(|s| s.phase == Phase::Focus)
        .map(|s| s.actual_duration_secs as f64 / 60.0)
        .sum();
    let total_break_time: f64 = day_sessions
        .iter()
        .filter(|s| s.phase.is_break())
        .map(|s| s.actual_duration_secs as f64 / 60.0)
        .sum();

    let completed_sessions = day_sessions.iter().filter(|s| s.completed).count();
    let interrupted_sessions = day_sessions.iter().filter(|s| s.interrupted).count();
    let total_sessions = day_sessions.len();

    let mut total_lines_added = 0u64;
    let mut total_keystrokes = 0u64;
    let mut active_coding_secs = 0.0f64;
    let mut files_edited: HashSet<&str> = HashSet::new();
    let mut languages_used: Vec<String> = Vec::new();

    for session in day_sessions.iter().filter(|s| s.phase == Phase::Focus) {
        let Some(coding) = session.coding_stats.as_ref() else {
            continue;
        };
        total_lines_added += coding.total_lines_added;
        total_keystrokes += coding.total_keystrokes;
        active_coding_secs += coding.coding_time_secs;
        for activity in &coding.activities {
            files_edited.insert(activity.file_id.as_str());
        }
        for language in &coding.languages_used {
            if !languages_used.contains(language) {
                languages_used.push(language.clone());
            }
        }
    }

    DailyStats {
        date,
        total_focus_time,
        total_break_time,
        completed_sessions,
        interrupted_sessions,
        total_sessions,
        productivity: ratio_percent(completed_sessions as f64, total_sessions as f64),
        longest_streak,
        most_used_sound: most_used_sound(day_sessions.iter().copied()),
        total_lines_added,
        total_keystrokes,
        files_edited: files_edited.len(),
        languages_used,
        active_coding_time: active_coding_secs / 60.0,
    }
}

fn calc_weekly(week_start: NaiveDate, grouped: &Grouped<'_>, longest_streak: u32) -> WeeklyStats {
    let daily: Vec<DailyStats> = (0..7)
        .map(|offset| calc_daily(week_start + Duration::days(offset), grouped, longest_streak))
        .collect();

    let total_focus_time: f64 = daily.iter().map(|day| day.total_focus_time).sum();

    // Strictly-greater keeps the earliest day on ties.
    let mut best_day = week_start;
    let mut best_focus = f64::NEG_INFINITY;
    for day in &daily {
        if day.total_focus_time > best_focus {
            best_focus = day.total_focus_time;
            best_day = day.date;
        }
    }

    let days_with_sessions = daily.iter().filter(|day| day.total_sessions > 0).count();

    WeeklyStats {
        week_start,
        daily_stats: daily,
        total_focus_time,
        average_daily_focus: total_focus_time / 7.0,
        best_day,
        consistency: days_with_sessions as f64 / 7.0 * 100.0,
    }
}

fn week_focus_minutes(week_start: NaiveDate, grouped: &Grouped<'_>) -> f64 {
    (0..7)
        .map(|offset| {
            grouped
                .get(&(week_start + Duration::days(offset)))
                .map(|day_sessions| {
                    day_sessions
                        .iter()
                        .filter(|s| s.phase == Phase::Focus)
                        .map(|s| s.actual_duration_secs as f64 / 60.0)
                        .sum()
                })
                .unwrap_or(0.0)
        })
        .sum()
}

fn most_used_sound<'a>(sessions: impl Iterator<Item = &'a SessionRecord>) -> Option<SoundType> {
    let mut counts: Vec<(SoundType, u64)> = Vec::new();
    for session in sessions {
        if let Some(sound) = session.sound_used {
            match counts.iter_mut().find(|(known, _)| *known == sound) {
                Some((_, count)) => *count += 1,
                None => counts.push((sound, 1)),
            }
        }
    }

    let mut best: Option<(SoundType, u64)> = None;
    for (sound, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((sound, count));
        }
    }
    best.map(|(sound, _)| sound)
}

fn pick_mode<'a>(counts: &[(&'a str, u64)]) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    for &(name, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name)
}

fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}
