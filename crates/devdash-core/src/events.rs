use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::SessionRecord;
use crate::timer::{SessionPhase, TimerStatus};

/// Every timer state change produces an Event.
/// The CLI prints them; observers get the two hot-path notifications below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: SessionPhase,
        remaining_secs: u64,
        cycle_number: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: SessionPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        previous_phase: SessionPhase,
        next_phase: SessionPhase,
        cycle_number: u32,
        record: SessionRecord,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        phase: SessionPhase,
        remaining_secs: u64,
        total_secs: u64,
        cycle_number: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}

/// Subscriber interface for the dashboard layer.
///
/// Both callbacks run synchronously on the engine's thread and must not block.
pub trait TimerObserver: Send + Sync {
    /// Fired once per tick while running, after the decrement.
    fn on_tick(&self, _remaining_secs: u64, _phase: SessionPhase) {}

    /// Fired once per phase transition.
    fn on_phase_complete(&self, _previous_phase: SessionPhase, _new_cycle_number: u32) {}
}
