//! Dashboard refresh: fetch history and commit activity, merge unsent
//! records, aggregate.

use std::sync::Arc;

use chrono::{Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::daily::{compute_daily, CommitFeed, DailyAggregate};
use super::weekly::{weekly_totals, WEEK_DAYS};
use super::StatsInvalidation;
use crate::record::SessionRecord;
use crate::recorder::SessionRecorder;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSettings {
    pub window_days: u32,
    /// Page size for the session history fetch.
    pub history_limit: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            history_limit: 50,
        }
    }
}

/// Everything the dashboard shows in one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub reference_date: NaiveDate,
    pub days: Vec<DailyAggregate>,
    pub today_focus_hours: f64,
    pub today_commits: u32,
    pub week_focus_hours: f64,
    pub week_commits: u32,
    pub streak: u32,
    /// History rows and records dropped as malformed.
    pub skipped_records: usize,
    /// Unsent local records merged into the history.
    pub pending_records: usize,
    pub commit_feed_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsView {
    Available(DashboardSummary),
    Unavailable { reason: String },
}

pub struct StatsService<T: Transport> {
    recorder: Arc<SessionRecorder<T>>,
    settings: StatsSettings,
    invalidation: Arc<StatsInvalidation>,
}

impl<T: Transport> StatsService<T> {
    pub fn new(recorder: Arc<SessionRecorder<T>>, settings: StatsSettings) -> Self {
        Self {
            recorder,
            settings,
            invalidation: Arc::new(StatsInvalidation::new()),
        }
    }

    /// Observer to subscribe to the timer engine.
    pub fn invalidation(&self) -> Arc<StatsInvalidation> {
        Arc::clone(&self.invalidation)
    }

    pub fn settings(&self) -> &StatsSettings {
        &self.settings
    }

    /// Whether a phase completed since the last successful refresh.
    pub fn is_stale(&self) -> bool {
        self.invalidation.is_stale()
    }

    pub async fn refresh<Tz: TimeZone>(&self, reference_date: NaiveDate, tz: &Tz) -> StatsView {
        let generation = self.invalidation.generation();
        let transport = self.recorder.transport();

        let remote = match transport.fetch_sessions(self.settings.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "session history unavailable");
                return StatsView::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let mut skipped = remote.malformed;
        let mut history: Vec<SessionRecord> = Vec::with_capacity(remote.sessions.len());
        for row in remote.sessions {
            match SessionRecord::try_from(row) {
                Ok(record) => history.push(record),
                Err(e) => {
                    debug!(error = %e, "skipping malformed history row");
                    skipped += 1;
                }
            }
        }
        let pending = self.recorder.pending_records();
        let pending_records = pending.len();
        history.extend(pending);

        let span = self.settings.window_days.max(WEEK_DAYS);
        let start = reference_date
            .checked_sub_days(Days::new(u64::from(span.saturating_sub(1))))
            .unwrap_or(reference_date);
        let (commits, commit_feed_available) =
            match transport.fetch_commit_activity(start, reference_date).await {
                Ok(activity) => (CommitFeed::from_activity(&activity), true),
                Err(e) => {
                    warn!(error = %e, "commit feed unavailable; showing zero commits");
                    (CommitFeed::new(), false)
                }
            };

        let daily = compute_daily(
            &history,
            &commits,
            reference_date,
            self.settings.window_days,
            tz,
        );
        let week = weekly_totals(&history, &commits, reference_date, tz);
        let today = week.days.last();

        self.invalidation.mark_refreshed(generation);

        StatsView::Available(DashboardSummary {
            reference_date,
            today_focus_hours: today.map(|d| d.focus_hours).unwrap_or(0.0),
            today_commits: today.map(|d| d.commit_count).unwrap_or(0),
            week_focus_hours: week.focus_hours,
            week_commits: week.commit_count,
            streak: week.streak,
            skipped_records: skipped + daily.skipped,
            pending_records,
            commit_feed_available,
            days: daily.days,
        })
    }
}
