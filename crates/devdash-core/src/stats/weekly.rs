use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::daily::{compute_daily, focus_minutes_by_day, round_hours, CommitFeed, DailyAggregate};
use crate::record::SessionRecord;

pub const WEEK_DAYS: u32 = 7;

/// Seven-day totals ending at a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub focus_minutes: u32,
    /// Rounded from the summed minutes, not from the per-day hours.
    pub focus_hours: f64,
    pub commit_count: u32,
    /// Consecutive days with focus time, ending at the reference date.
    pub streak: u32,
    pub days: Vec<DailyAggregate>,
}

pub fn weekly_totals<Tz: TimeZone>(
    history: &[SessionRecord],
    commits: &CommitFeed,
    reference_date: NaiveDate,
    tz: &Tz,
) -> WeeklyTotals {
    let report = compute_daily(history, commits, reference_date, WEEK_DAYS, tz);
    let focus_minutes = report
        .days
        .iter()
        .fold(0u32, |acc, d| acc.saturating_add(d.focus_minutes));
    let commit_count = report
        .days
        .iter()
        .fold(0u32, |acc, d| acc.saturating_add(d.commit_count));
    let (by_day, _) = focus_minutes_by_day(history, tz);

    WeeklyTotals {
        focus_minutes,
        focus_hours: round_hours(focus_minutes),
        commit_count,
        streak: focus_streak(&by_day, reference_date),
        days: report.days,
    }
}

/// Count back from `reference_date` until a day without focus time.
///
/// Not bounded by the week: a long streak keeps counting as far back as the
/// history goes.
pub fn focus_streak(focus_by_day: &HashMap<NaiveDate, u32>, reference_date: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(reference_date);
    while let Some(current) = day {
        if focus_by_day.get(&current).copied().unwrap_or(0) == 0 {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }
    streak
}
