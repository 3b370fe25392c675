//! Request/response boundary to the remote DevDash service.
//!
//! The core only needs three calls: post a finished session, read back the
//! session history, and read the per-day commit feed. [`HttpTransport`] is the
//! production implementation; tests substitute in-memory fakes.

mod http;
mod memory;

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, ValidationError};
use crate::record::{parse_timestamp, RemoteSession, SessionPayload};

pub use http::HttpTransport;
pub use memory::{MemoryTransport, ScriptedFailure};

/// Remote session store and activity feed.
pub trait Transport: Send + Sync {
    /// `POST /api/pomodoro/sessions`.
    fn post_session(
        &self,
        payload: &SessionPayload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `GET /api/pomodoro/sessions?limit=N`, newest first.
    fn fetch_sessions(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<SessionHistory, TransportError>> + Send;

    /// `GET /api/github/stats?start_date=..&end_date=..` (inclusive).
    fn fetch_commit_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CommitActivity>, TransportError>> + Send;
}

/// One page of session history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHistory {
    /// Newest first.
    pub sessions: Vec<RemoteSession>,
    /// Rows that could not be decoded at all and were left out.
    pub malformed: usize,
}

impl SessionHistory {
    pub fn new(sessions: Vec<RemoteSession>) -> Self {
        Self {
            sessions,
            malformed: 0,
        }
    }
}

/// Commits made on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitActivity {
    pub date: NaiveDate,
    pub commits: u32,
}

/// One row of the commit feed as the server sends it. `date` may be a plain
/// date or a full timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCommitStat {
    pub date: String,
    #[serde(default)]
    pub commits: i64,
}

impl TryFrom<RemoteCommitStat> for CommitActivity {
    type Error = ValidationError;

    fn try_from(stat: RemoteCommitStat) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(stat.date.trim(), "%Y-%m-%d")
            .or_else(|_| parse_timestamp(&stat.date).map(|ts| ts.date_naive()))?;
        let commits = u32::try_from(stat.commits).map_err(|_| ValidationError::InvalidValue {
            field: "commits".into(),
            message: format!("{} is not a valid commit count", stat.commits),
        })?;
        Ok(CommitActivity { date, commits })
    }
}
