//! Statistics for the dashboard
//!
//! Pure aggregation lives in [`daily`] and [`weekly`]; [`StatsService`]
//! fetches the inputs and assembles a [`DashboardSummary`].

mod daily;
mod service;
mod weekly;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::events::TimerObserver;
use crate::timer::SessionPhase;

pub use daily::{
    compute_daily, focus_minutes_by_day, round_hours, window_dates, CommitFeed, DailyAggregate,
    DailyReport, MAX_WINDOW_DAYS,
};
pub use service::{DashboardSummary, StatsService, StatsSettings, StatsView};
pub use weekly::{focus_streak, weekly_totals, WeeklyTotals, WEEK_DAYS};

/// Marks the dashboard stale whenever a phase completes.
#[derive(Debug, Default)]
pub struct StatsInvalidation {
    changes: AtomicU64,
    refreshed: AtomicU64,
    has_refreshed: AtomicBool,
}

impl StatsInvalidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.changes.load(Ordering::Acquire)
    }

    /// Record a refresh that started at `generation`.
    pub fn mark_refreshed(&self, generation: u64) {
        self.refreshed.fetch_max(generation, Ordering::AcqRel);
        self.has_refreshed.store(true, Ordering::Release);
    }

    pub fn is_stale(&self) -> bool {
        !self.has_refreshed.load(Ordering::Acquire)
            || self.refreshed.load(Ordering::Acquire) < self.generation()
    }
}

impl TimerObserver for StatsInvalidation {
    fn on_phase_complete(&self, _previous_phase: SessionPhase, _new_cycle_number: u32) {
        self.changes.fetch_add(1, Ordering::AcqRel);
    }
}
