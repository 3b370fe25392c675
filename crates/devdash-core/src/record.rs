//! Session records and their wire representations.
//!
//! A [`SessionRecord`] is the immutable fact that a phase of a given length
//! completed (or was abandoned) at a point in time. [`SessionPayload`] is what
//! gets posted to the remote store; [`RemoteSession`] is what comes back from
//! a history fetch, loosely typed so one bad row cannot fail the whole page.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::SessionPhase;

/// Longest session accepted by the aggregator (one full day).
pub const MAX_SESSION_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    duration_minutes: u32,
    phase: SessionPhase,
    completed: bool,
    started_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        phase: SessionPhase,
        duration_minutes: u32,
        completed: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            duration_minutes,
            phase,
            completed,
            started_at,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Reject records the aggregator cannot sum safely.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_minutes == 0 || self.duration_minutes > MAX_SESSION_MINUTES {
            return Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!(
                    "{} minutes is outside 1..={MAX_SESSION_MINUTES}",
                    self.duration_minutes
                ),
            });
        }
        Ok(())
    }

    /// Completed work sessions are the only ones that count as focus time.
    pub fn counts_as_focus(&self) -> bool {
        self.completed && self.phase == SessionPhase::Work
    }

    pub fn to_payload(&self) -> SessionPayload {
        SessionPayload {
            duration: self.duration_minutes,
            session_type: self.phase,
            completed: self.completed,
        }
    }
}

/// Body of `POST /api/pomodoro/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Minutes.
    pub duration: u32,
    pub session_type: SessionPhase,
    pub completed: bool,
}

/// One row of `GET /api/pomodoro/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    #[serde(default)]
    pub id: Option<i64>,
    pub duration: i64,
    #[serde(default = "default_session_type")]
    pub session_type: String,
    #[serde(default)]
    pub completed: bool,
    pub started_at: String,
}

fn default_session_type() -> String {
    "work".into()
}

impl TryFrom<RemoteSession> for SessionRecord {
    type Error = ValidationError;

    fn try_from(remote: RemoteSession) -> Result<Self, Self::Error> {
        let duration_minutes = u32::try_from(remote.duration).map_err(|_| {
            ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!("{} is not a valid minute count", remote.duration),
            }
        })?;
        let phase = remote.session_type.parse::<SessionPhase>()?;
        let started_at = parse_timestamp(&remote.started_at)?;
        let record = SessionRecord::new(phase, duration_minutes, remote.completed, started_at);
        record.validate()?;
        Ok(record)
    }
}

/// Parse an ISO-8601 timestamp. Naive timestamps (no offset) are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| ValidationError::Timestamp(raw.to_string()))
}
