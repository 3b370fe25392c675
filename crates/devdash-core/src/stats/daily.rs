//! Per-day focus and commit aggregation.
//!
//! Days are local calendar days in the caller's time zone: a session counts
//! toward the day its `started_at` falls on, from 00:00 up to but excluding
//! the next midnight.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::SessionRecord;
use crate::transport::CommitActivity;

/// Widest daily window the dashboard will build.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// One day of the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub commit_count: u32,
    pub focus_minutes: u32,
    /// `focus_minutes / 60`, rounded half-up to two decimals.
    pub focus_hours: f64,
}

/// Result of [`compute_daily`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// Oldest first; the last entry is the reference date.
    pub days: Vec<DailyAggregate>,
    /// Records left out because they failed validation.
    pub skipped: usize,
}

impl DailyReport {
    pub fn day(&self, date: NaiveDate) -> Option<&DailyAggregate> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Commit counts keyed by calendar date. Dates with no entry have zero commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFeed {
    by_date: HashMap<NaiveDate, u32>,
}

impl CommitFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate dates are summed.
    pub fn from_activity(activity: &[CommitActivity]) -> Self {
        let mut by_date: HashMap<NaiveDate, u32> = HashMap::new();
        for row in activity {
            let slot = by_date.entry(row.date).or_default();
            *slot = slot.saturating_add(row.commits);
        }
        Self { by_date }
    }

    pub fn commits_on(&self, date: NaiveDate) -> u32 {
        self.by_date.get(&date).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Minutes to hours, rounded half-up to two decimals (50 min → 0.83).
pub fn round_hours(minutes: u32) -> f64 {
    let hundredths = (u64::from(minutes) * 100 + 30) / 60;
    hundredths as f64 / 100.0
}

/// Focus minutes per local day across the whole history, plus the number of
/// records that failed validation.
pub fn focus_minutes_by_day<Tz: TimeZone>(
    history: &[SessionRecord],
    tz: &Tz,
) -> (HashMap<NaiveDate, u32>, usize) {
    let mut by_day: HashMap<NaiveDate, u32> = HashMap::new();
    let mut skipped = 0;
    for record in history {
        if let Err(e) = record.validate() {
            debug!(error = %e, "skipping invalid session record");
            skipped += 1;
            continue;
        }
        if !record.counts_as_focus() {
            continue;
        }
        let day = record.started_at().with_timezone(tz).date_naive();
        let slot = by_day.entry(day).or_default();
        *slot = slot.saturating_add(record.duration_minutes());
    }
    (by_day, skipped)
}

/// The `window_days` calendar dates ending at `reference_date`, oldest first.
pub fn window_dates(reference_date: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (0..window_days)
        .rev()
        .filter_map(|offset| reference_date.checked_sub_days(Days::new(u64::from(offset))))
        .collect()
}

/// Build the daily window ending at `reference_date` (inclusive).
///
/// Only completed work sessions contribute focus time. Days without sessions
/// or commits are present with zeros.
pub fn compute_daily<Tz: TimeZone>(
    history: &[SessionRecord],
    commits: &CommitFeed,
    reference_date: NaiveDate,
    window_days: u32,
    tz: &Tz,
) -> DailyReport {
    let (by_day, skipped) = focus_minutes_by_day(history, tz);
    let days = window_dates(reference_date, window_days)
        .into_iter()
        .map(|date| {
            let focus_minutes = by_day.get(&date).copied().unwrap_or(0);
            DailyAggregate {
                date,
                commit_count: commits.commits_on(date),
                focus_minutes,
                focus_hours: round_hours(focus_minutes),
            }
        })
        .collect();
    DailyReport { days, skipped }
}
