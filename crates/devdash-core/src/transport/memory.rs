//! In-process transport used for offline runs and tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};

use super::{CommitActivity, SessionHistory, Transport};
use crate::error::TransportError;
use crate::record::{RemoteSession, SessionPayload};

/// Failure to inject into the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    Offline,
    Status(u16),
    Unauthorized,
}

impl ScriptedFailure {
    fn into_error(self) -> TransportError {
        match self {
            ScriptedFailure::Offline => TransportError::Unavailable("offline".into()),
            ScriptedFailure::Status(status) => TransportError::Status {
                status,
                body: String::new(),
            },
            ScriptedFailure::Unauthorized => TransportError::Unauthorized { status: 401 },
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: Vec<RemoteSession>,
    commits: Vec<CommitActivity>,
    post_failures: VecDeque<ScriptedFailure>,
    offline: bool,
    history_offline: bool,
    commits_offline: bool,
    post_attempts: usize,
    next_id: i64,
}

/// Behaves like the remote store: posted sessions are stamped with the
/// current time and show up in later history fetches.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(self, sessions: Vec<RemoteSession>) -> Self {
        {
            let mut state = self.lock();
            state.next_id = state.next_id.max(sessions.len() as i64);
            state.sessions = sessions;
        }
        self
    }

    pub fn with_commits(self, commits: Vec<CommitActivity>) -> Self {
        self.lock().commits = commits;
        self
    }

    /// Every call fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_history_offline(&self, offline: bool) {
        self.lock().history_offline = offline;
    }

    pub fn set_commits_offline(&self, offline: bool) {
        self.lock().commits_offline = offline;
    }

    /// Queue a failure for the next post attempt.
    pub fn fail_next_post(&self, failure: ScriptedFailure) {
        self.lock().post_failures.push_back(failure);
    }

    /// Sessions the store has accepted, oldest first.
    pub fn stored_sessions(&self) -> Vec<RemoteSession> {
        self.lock().sessions.clone()
    }

    pub fn post_attempts(&self) -> usize {
        self.lock().post_attempts
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    async fn post_session(&self, payload: &SessionPayload) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.post_attempts += 1;
        if state.offline {
            return Err(ScriptedFailure::Offline.into_error());
        }
        if let Some(failure) = state.post_failures.pop_front() {
            return Err(failure.into_error());
        }
        state.next_id += 1;
        let id = state.next_id;
        state.sessions.push(RemoteSession {
            id: Some(id),
            duration: i64::from(payload.duration),
            session_type: payload.session_type.as_str().to_string(),
            completed: payload.completed,
            started_at: Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    async fn fetch_sessions(&self, limit: usize) -> Result<SessionHistory, TransportError> {
        let state = self.lock();
        if state.offline || state.history_offline {
            return Err(ScriptedFailure::Offline.into_error());
        }
        Ok(SessionHistory::new(
            state.sessions.iter().rev().take(limit).cloned().collect(),
        ))
    }

    async fn fetch_commit_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CommitActivity>, TransportError> {
        let state = self.lock();
        if state.offline || state.commits_offline {
            return Err(ScriptedFailure::Offline.into_error());
        }
        Ok(state
            .commits
            .iter()
            .filter(|c| c.date >= start && c.date <= end)
            .copied()
            .collect())
    }
}
