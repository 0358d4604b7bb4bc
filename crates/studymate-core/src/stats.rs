//! Read-only aggregation over the progress state.
//!
//! Everything here is a pure view: summaries for the stats panel, the
//! weekly series, the monthly total, and the best-study-hours ranking.
//! Nothing in this module creates or mutates records.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::levels::{self, LevelDef};
use crate::progress::ProgressState;

/// Headline numbers for the stats panel.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub points: u64,
    pub spendable_points: u64,
    pub level: u32,
    pub level_name: String,
    pub level_icon: String,
    pub points_to_next_level: Option<u64>,
    pub total_study_minutes: u64,
    pub today_study_minutes: u32,
    pub consecutive_days: u32,
    pub achievements_count: usize,
    pub today_focus_score: u32,
}

/// One day of the weekly series.
#[derive(Debug, Clone, Serialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub weekday: String,
    pub study_minutes: u32,
    pub focus_score: u32,
}

/// One ranked entry of the best-study-hours view.
#[derive(Debug, Clone, Serialize)]
pub struct HourStat {
    /// Hour of day (0-23)
    pub hour: u32,
    pub minutes: u64,
    pub label: String,
}

/// Position within the current level, for progress-bar rendering.
#[derive(Debug, Clone, Serialize)]
pub struct LevelProgress {
    pub level: LevelDef,
    pub points_into_level: u64,
    pub points_to_next: Option<u64>,
    /// 0-100; pinned to 100 at the maximum level.
    pub percent: f64,
}

pub fn summary(state: &ProgressState, today: NaiveDate) -> StatsSummary {
    let level = levels::level_for(state.points);
    StatsSummary {
        points: state.points,
        spendable_points: state.spendable_points,
        level: level.level,
        level_name: level.name.to_string(),
        level_icon: level.icon.to_string(),
        points_to_next_level: levels::points_to_next(level.level),
        total_study_minutes: state.total_study_minutes,
        today_study_minutes: state.today_study_minutes,
        consecutive_days: state.consecutive_days,
        achievements_count: state.achievements.len(),
        today_focus_score: state.day_record(today).map(|r| r.focus_score).unwrap_or(0),
    }
}

/// The Monday-start week containing `today`, one entry per day.
/// Days without a record report zero.
pub fn weekly(state: &ProgressState, today: NaiveDate) -> Vec<DayStat> {
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    (0..7)
        .map(|offset| {
            let date = week_start + Duration::days(offset);
            let record = state.day_record(date);
            DayStat {
                date,
                weekday: date.format("%a").to_string(),
                study_minutes: record.map(|r| r.study_minutes).unwrap_or(0),
                focus_score: record.map(|r| r.focus_score).unwrap_or(0),
            }
        })
        .collect()
}

/// Total study minutes recorded in the calendar month containing `today`.
pub fn monthly_minutes(state: &ProgressState, today: NaiveDate) -> u64 {
    state
        .daily_records
        .iter()
        .filter(|r| r.date.year() == today.year() && r.date.month() == today.month())
        .map(|r| u64::from(r.study_minutes))
        .sum()
}

/// The three hours of day with the most accumulated study minutes,
/// ranked descending. Hours with no minutes are omitted.
pub fn best_study_hours(state: &ProgressState) -> Vec<HourStat> {
    let mut totals = [0u64; 24];
    for record in &state.daily_records {
        for (hour, minutes) in record.hourly_minutes.iter().enumerate() {
            totals[hour] += u64::from(*minutes);
        }
    }

    let mut ranked: Vec<(u32, u64)> = totals
        .iter()
        .enumerate()
        .filter(|(_, m)| **m > 0)
        .map(|(h, m)| (h as u32, *m))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(3)
        .map(|(hour, minutes)| HourStat {
            hour,
            minutes,
            label: format!("{hour}:00 - {}:00", hour + 1),
        })
        .collect()
}

pub fn level_progress(state: &ProgressState) -> LevelProgress {
    let level = levels::level_for(state.points);
    let points_to_next = levels::points_to_next(level.level);
    let points_into_level = state.points - level.min_points;
    let percent = match points_to_next {
        Some(next) => {
            let span = (next - level.min_points) as f64;
            (points_into_level as f64 / span * 100.0).min(100.0)
        }
        None => 100.0,
    };
    LevelProgress {
        level,
        points_into_level,
        points_to_next,
        percent,
    }
}
