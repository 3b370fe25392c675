use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One leg of the work/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Work,
    Break,
}

impl SessionPhase {
    /// Wire name used by the remote store (`session_type`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Work => "work",
            SessionPhase::Break => "break",
        }
    }

    /// The phase that follows this one.
    pub fn next(&self) -> Self {
        match self {
            SessionPhase::Work => SessionPhase::Break,
            SessionPhase::Break => SessionPhase::Work,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(SessionPhase::Work),
            "break" => Ok(SessionPhase::Break),
            other => Err(ValidationError::UnknownSessionType(other.to_string())),
        }
    }
}

/// Default length of each phase, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub work_min: u32,
    pub break_min: u32,
}

impl PhaseDurations {
    pub fn minutes(&self, phase: SessionPhase) -> u32 {
        match phase {
            SessionPhase::Work => self.work_min,
            SessionPhase::Break => self.break_min,
        }
    }

    /// Phase length in seconds.
    ///
    /// Uses saturating arithmetic so absurd config values cannot overflow.
    pub fn secs(&self, phase: SessionPhase) -> u64 {
        u64::from(self.minutes(phase)).saturating_mul(60)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            work_min: 25,
            break_min: 5,
        }
    }
}
