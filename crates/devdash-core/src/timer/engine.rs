//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - it arms a [`TickScheduler`] and the owner of that
//! scheduler calls `tick()` once per second while it is armed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> (phase complete) -> Idle
//!   ^                                                          |
//!   +------------------------- reset --------------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerOptions::default(), ManualScheduler::new(), Box::new(NullSink));
//! engine.start();
//! // Once per second while running:
//! engine.tick()?; // Returns Some(Event::PhaseCompleted) when the phase ends
//! ```

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::phase::{PhaseDurations, SessionPhase};
use super::scheduler::{ManualScheduler, TickScheduler};
use crate::error::InvalidTransition;
use crate::events::{Event, TimerObserver};
use crate::record::SessionRecord;
use crate::recorder::RecordSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Snapshot of the engine's mutable state.
///
/// Only the engine mutates it; callers get copies for display or to save
/// between process runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    phase: SessionPhase,
    remaining_secs: u64,
    cycle_number: u32,
    status: TimerStatus,
    /// When the current phase was first started.
    #[serde(default)]
    phase_started_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TimerState {
    /// Idle, Work, full work duration, cycle 1.
    pub fn initial(durations: &PhaseDurations) -> Self {
        Self {
            phase: SessionPhase::Work,
            remaining_secs: durations.secs(SessionPhase::Work),
            cycle_number: 1,
            status: TimerStatus::Idle,
            phase_started_at: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn cycle_number(&self) -> u32 {
        self.cycle_number
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// Behavior knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerOptions {
    pub durations: PhaseDurations,
    /// Start the next phase automatically instead of resting Idle.
    pub auto_continue: bool,
}

/// Core timer engine.
pub struct TimerEngine<S: TickScheduler = ManualScheduler> {
    options: TimerOptions,
    state: TimerState,
    scheduler: S,
    sink: Box<dyn RecordSink>,
    observers: Vec<Arc<dyn TimerObserver>>,
    clock: Arc<dyn Clock>,
}

impl<S: TickScheduler> TimerEngine<S> {
    /// Create a new engine in the `Idle` state with a full work phase ready.
    pub fn new(options: TimerOptions, scheduler: S, sink: Box<dyn RecordSink>) -> Self {
        Self {
            state: TimerState::initial(&options.durations),
            options,
            scheduler,
            sink,
            observers: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Restore a previously saved state.
    ///
    /// A state saved while running comes back paused: nothing was ticking
    /// while the engine was not alive. The cycle number is at least 1 and the
    /// remaining time never exceeds the configured phase length, which may
    /// have shrunk since the state was saved.
    pub fn with_state(mut self, mut state: TimerState) -> Self {
        if state.status == TimerStatus::Running {
            state.status = TimerStatus::Paused;
        }
        state.cycle_number = state.cycle_number.max(1);
        state.remaining_secs = state
            .remaining_secs
            .min(self.options.durations.secs(state.phase));
        self.scheduler.disarm();
        self.state = state;
        self
    }

    pub fn subscribe(&mut self, observer: Arc<dyn TimerObserver>) {
        self.observers.push(observer);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn cycle_number(&self) -> u32 {
        self.state.cycle_number
    }

    pub fn options(&self) -> &TimerOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn total_secs(&self) -> u64 {
        self.options.durations.secs(self.state.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.remaining_secs as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.state.status,
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.total_secs(),
            cycle_number: self.state.cycle_number,
            progress: self.phase_progress(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let resuming = match self.state.status {
            TimerStatus::Running => return None, // Already running.
            TimerStatus::Idle => false,
            TimerStatus::Paused => true,
        };

        let now = self.clock.now();
        if self.state.phase_started_at.is_none() {
            self.state.phase_started_at = Some(now);
        }

        if self.state.remaining_secs == 0 {
            debug!(phase = %self.state.phase, "start with nothing left; completing phase");
            return Some(self.complete_phase());
        }

        self.state.status = TimerStatus::Running;
        self.scheduler.arm();
        debug!(
            phase = %self.state.phase,
            remaining_secs = self.state.remaining_secs,
            resuming,
            "timer running"
        );

        Some(if resuming {
            Event::TimerResumed {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
                at: now,
            }
        } else {
            Event::TimerStarted {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
                cycle_number: self.state.cycle_number,
                at: now,
            }
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.status != TimerStatus::Running {
            return None;
        }
        self.scheduler.disarm();
        self.state.status = TimerStatus::Paused;
        debug!(remaining_secs = self.state.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Back to Idle / Work / full duration / cycle 1. Always succeeds.
    pub fn reset(&mut self) -> Option<Event> {
        self.scheduler.disarm();
        self.state = TimerState::initial(&self.options.durations);
        debug!("timer reset");
        Some(Event::TimerReset {
            at: self.clock.now(),
        })
    }

    /// Advance by one second. Returns `Some(Event::PhaseCompleted)` when the
    /// phase finishes.
    ///
    /// Only valid while running; otherwise the call is rejected and the
    /// state is left untouched.
    pub fn tick(&mut self) -> Result<Option<Event>, InvalidTransition> {
        if self.state.status != TimerStatus::Running {
            warn!(status = ?self.state.status, "tick rejected");
            return Err(InvalidTransition {
                operation: "tick",
                state: self.state.status,
            });
        }

        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        for observer in &self.observers {
            observer.on_tick(self.state.remaining_secs, self.state.phase);
        }

        if self.state.remaining_secs == 0 {
            return Ok(Some(self.complete_phase()));
        }
        Ok(None)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> Event {
        self.scheduler.disarm();

        let now = self.clock.now();
        let previous = self.state.phase;
        let minutes = self.options.durations.minutes(previous);
        let started_at = self
            .state
            .phase_started_at
            .take()
            .unwrap_or_else(|| now - Duration::minutes(i64::from(minutes)));
        let record = SessionRecord::new(previous, minutes, true, started_at);
        self.sink.submit(record.clone());

        let next = previous.next();
        if previous == SessionPhase::Break {
            self.state.cycle_number = self.state.cycle_number.saturating_add(1);
        }
        self.state.phase = next;
        self.state.remaining_secs = self.options.durations.secs(next);
        self.state.status = TimerStatus::Idle;

        info!(
            previous = %previous,
            next = %next,
            cycle = self.state.cycle_number,
            "phase completed"
        );
        for observer in &self.observers {
            observer.on_phase_complete(previous, self.state.cycle_number);
        }

        if self.options.auto_continue && self.state.remaining_secs > 0 {
            self.state.phase_started_at = Some(now);
            self.state.status = TimerStatus::Running;
            self.scheduler.arm();
        }

        Event::PhaseCompleted {
            previous_phase: previous,
            next_phase: next,
            cycle_number: self.state.cycle_number,
            record,
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::MemorySink;
    use crate::timer::FixedClock;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        ticks: Mutex<Vec<(u64, SessionPhase)>>,
        completions: Mutex<Vec<(SessionPhase, u32)>>,
    }

    impl TimerObserver for Recorded {
        fn on_tick(&self, remaining_secs: u64, phase: SessionPhase) {
            self.ticks.lock().unwrap().push((remaining_secs, phase));
        }

        fn on_phase_complete(&self, previous_phase: SessionPhase, new_cycle_number: u32) {
            self.completions
                .lock()
                .unwrap()
                .push((previous_phase, new_cycle_number));
        }
    }

    fn short_options() -> TimerOptions {
        TimerOptions {
            durations: PhaseDurations {
                work_min: 1,
                break_min: 1,
            },
            auto_continue: false,
        }
    }

    fn engine_with(options: TimerOptions) -> (TimerEngine, MemorySink) {
        let sink = MemorySink::new();
        let engine = TimerEngine::new(options, ManualScheduler::new(), Box::new(sink.clone()))
            .with_clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap(),
            )));
        (engine, sink)
    }

    fn run_phase(engine: &mut TimerEngine) -> Event {
        engine.start();
        loop {
            if let Some(event) = engine.tick().unwrap() {
                return event;
            }
        }
    }

    #[test]
    fn initial_state() {
        let (engine, _) = engine_with(TimerOptions::default());
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.phase(), SessionPhase::Work);
        assert_eq!(engine.remaining_secs(), 1500);
        assert_eq!(engine.cycle_number(), 1);
        assert!(!engine.scheduler().is_armed());
    }

    #[test]
    fn start_pause_start() {
        let (mut engine, _) = engine_with(TimerOptions::default());

        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.status(), TimerStatus::Running);
        assert!(engine.scheduler().is_armed());
        assert!(engine.start().is_none());

        for _ in 0..10 {
            engine.tick().unwrap();
        }
        assert!(matches!(
            engine.pause(),
            Some(Event::TimerPaused { remaining_secs: 1490, .. })
        ));
        assert!(!engine.scheduler().is_armed());
        assert!(engine.pause().is_none());

        assert!(matches!(engine.start(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.remaining_secs(), 1490);
    }

    #[test]
    fn tick_rejected_when_not_running() {
        let (mut engine, _) = engine_with(TimerOptions::default());
        let before = engine.state().clone();
        let err = engine.tick().unwrap_err();
        assert_eq!(err.state, TimerStatus::Idle);
        assert_eq!(engine.state(), &before);

        engine.start();
        engine.pause();
        assert!(engine.tick().is_err());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn work_completion_emits_record_and_rests_idle() {
        let (mut engine, sink) = engine_with(TimerOptions::default());
        let observer = Arc::new(Recorded::default());
        engine.subscribe(observer.clone());

        let event = run_phase(&mut engine);
        match event {
            Event::PhaseCompleted {
                previous_phase,
                next_phase,
                cycle_number,
                record,
                ..
            } => {
                assert_eq!(previous_phase, SessionPhase::Work);
                assert_eq!(next_phase, SessionPhase::Break);
                assert_eq!(cycle_number, 1);
                assert_eq!(record.duration_minutes(), 25);
                assert!(record.completed());
            }
            other => panic!("Expected PhaseCompleted, got {other:?}"),
        }

        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.phase(), SessionPhase::Break);
        assert_eq!(engine.remaining_secs(), 300);
        assert!(!engine.scheduler().is_armed());
        assert_eq!(sink.records().len(), 1);
        assert_eq!(
            *observer.completions.lock().unwrap(),
            vec![(SessionPhase::Work, 1)]
        );
        assert_eq!(observer.ticks.lock().unwrap().len(), 1500);
    }

    #[test]
    fn break_completion_increments_cycle() {
        let (mut engine, sink) = engine_with(TimerOptions::default());
        run_phase(&mut engine);
        run_phase(&mut engine);
        assert_eq!(engine.phase(), SessionPhase::Work);
        assert_eq!(engine.cycle_number(), 2);

        let records = sink.records();
        assert_eq!(records[1].phase(), SessionPhase::Break);
        assert_eq!(records[1].duration_minutes(), 5);
    }

    #[test]
    fn record_started_at_is_first_start_of_phase() {
        let (mut engine, sink) = engine_with(short_options());
        let first = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        engine.start();
        engine.pause();
        engine.clock = Arc::new(FixedClock(first + Duration::minutes(10)));
        engine.start();
        while engine.tick().unwrap().is_none() {}
        assert_eq!(sink.records()[0].started_at(), first);
    }

    #[test]
    fn auto_continue_keeps_running() {
        let mut options = short_options();
        options.auto_continue = true;
        let (mut engine, _) = engine_with(options);
        run_phase(&mut engine);
        assert_eq!(engine.status(), TimerStatus::Running);
        assert_eq!(engine.phase(), SessionPhase::Break);
        assert!(engine.scheduler().is_armed());
        assert!(engine.tick().unwrap().is_none());
    }

    #[test]
    fn start_with_zero_remaining_completes_immediately() {
        let (engine, sink) = engine_with(TimerOptions::default());
        let mut saved = engine.state().clone();
        saved.remaining_secs = 0;
        let mut engine = engine.with_state(saved);

        let event = engine.start();
        assert!(matches!(event, Some(Event::PhaseCompleted { .. })));
        assert_eq!(engine.phase(), SessionPhase::Break);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn restored_running_state_comes_back_paused() {
        let (mut engine, _) = engine_with(TimerOptions::default());
        engine.start();
        engine.tick().unwrap();
        let saved = engine.state().clone();
        assert!(saved.is_running());

        let (fresh, _) = engine_with(TimerOptions::default());
        let restored = fresh.with_state(saved);
        assert_eq!(restored.status(), TimerStatus::Paused);
        assert_eq!(restored.remaining_secs(), 1499);
    }

    #[test]
    fn restored_state_is_clamped_to_current_durations() {
        let saved: TimerState = serde_json::from_str(
            r#"{"phase":"work","remaining_secs":1500,"cycle_number":0,"status":"paused"}"#,
        )
        .unwrap();
        let mut options = TimerOptions::default();
        options.durations.work_min = 10;
        let (engine, _) = engine_with(options);

        let restored = engine.with_state(saved);
        assert_eq!(restored.cycle_number(), 1);
        assert_eq!(restored.remaining_secs(), 600);
        assert_eq!(restored.total_secs(), 600);
        assert_eq!(restored.phase_progress(), 0.0);
        match restored.snapshot() {
            Event::StateSnapshot { progress, .. } => assert!((0.0..=1.0).contains(&progress)),
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut engine, _) = engine_with(TimerOptions::default());
        engine.start();
        engine.tick().unwrap();
        engine.reset();
        let once = engine.state().clone();
        engine.reset();
        assert_eq!(engine.state(), &once);
        assert_eq!(once, TimerState::initial(&PhaseDurations::default()));
    }

    #[test]
    fn pause_then_reset_leaves_scheduler_disarmed() {
        let (mut engine, _) = engine_with(TimerOptions::default());
        engine.start();
        engine.pause();
        engine.reset();
        assert!(!engine.scheduler().is_armed());
        assert!(engine.tick().is_err());
    }

    #[test]
    fn reset_after_three_cycles() {
        let (mut engine, sink) = engine_with(short_options());
        for _ in 0..6 {
            run_phase(&mut engine);
        }
        assert_eq!(engine.cycle_number(), 4);
        assert_eq!(sink.records().len(), 6);

        engine.reset();
        assert_eq!(engine.cycle_number(), 1);
        assert_eq!(engine.phase(), SessionPhase::Work);
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (engine, _) = engine_with(TimerOptions::default());
        match engine.snapshot() {
            Event::StateSnapshot {
                status,
                remaining_secs,
                total_secs,
                progress,
                ..
            } => {
                assert_eq!(status, TimerStatus::Idle);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(total_secs, 1500);
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    proptest! {
        #[test]
        fn completes_exactly_once_after_remaining_ticks(work_min in 1u32..=30, pause_at in 0u64..1800) {
            let options = TimerOptions {
                durations: PhaseDurations { work_min, break_min: 5 },
                auto_continue: false,
            };
            let (mut engine, sink) = engine_with(options);
            let observer = Arc::new(Recorded::default());
            engine.subscribe(observer.clone());
            engine.start();

            let total = engine.remaining_secs();
            let mut completions = 0;
            for i in 0..total {
                if i == pause_at {
                    let held = engine.remaining_secs();
                    engine.pause();
                    engine.start();
                    prop_assert_eq!(engine.remaining_secs(), held);
                }
                if engine.tick().unwrap().is_some() {
                    completions += 1;
                }
            }

            prop_assert_eq!(completions, 1);
            prop_assert_eq!(sink.records().len(), 1);
            prop_assert_eq!(engine.status(), TimerStatus::Idle);
            let ticks = observer.ticks.lock().unwrap();
            prop_assert_eq!(ticks.len() as u64, total);
            prop_assert_eq!(ticks.last().map(|t| t.0), Some(0));
        }
    }
}
