//! Tokio wiring for the timer engine.
//!
//! [`TokioTicker`] is the production [`TickScheduler`]: while armed it sends
//! one [`Tick`] per period over a channel. [`TimerDriver`] owns the engine and
//! is the only place it is mutated; it interleaves user commands with ticks.
//!
//! Every tick carries the generation it was armed under. Disarming bumps the
//! generation, so a tick already sitting in the channel when the timer is
//! paused or reset is dropped instead of counting down.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::events::Event;
use crate::timer::{TickScheduler, TimerEngine, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

pub struct TokioTicker {
    period: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                period,
                tx,
                generation: 0,
                handle: None,
            },
            rx,
        )
    }

    /// One tick per second.
    pub fn per_second() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        Self::new(Duration::from_secs(1))
    }

    /// Whether `tick` was produced by the current arming.
    pub fn is_current(&self, tick: &Tick) -> bool {
        self.handle.is_some() && tick.generation == self.generation
    }
}

impl TickScheduler for TokioTicker {
    fn arm(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "no tokio runtime; ticker not armed");
                return;
            }
        };

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();
        self.handle = Some(runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.generation = self.generation.wrapping_add(1);
        }
    }

    fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// User controls forwarded to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// Emit an `Event::StateSnapshot`.
    Snapshot,
    Shutdown,
}

pub struct TimerDriver {
    engine: TimerEngine<TokioTicker>,
    ticks: mpsc::UnboundedReceiver<Tick>,
}

impl TimerDriver {
    pub fn new(engine: TimerEngine<TokioTicker>, ticks: mpsc::UnboundedReceiver<Tick>) -> Self {
        Self { engine, ticks }
    }

    pub fn engine(&self) -> &TimerEngine<TokioTicker> {
        &self.engine
    }

    /// Run until `Shutdown` or until every command sender is gone, then
    /// return the final state so the caller can save it.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<Event>,
    ) -> TimerState {
        let emit = |event: Option<Event>| {
            if let Some(event) = event {
                let _ = events.send(event);
            }
        };

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Start) => emit(self.engine.start()),
                    Some(Command::Pause) => emit(self.engine.pause()),
                    Some(Command::Reset) => emit(self.engine.reset()),
                    Some(Command::Snapshot) => emit(Some(self.engine.snapshot())),
                    Some(Command::Shutdown) | None => break,
                },

                Some(tick) = self.ticks.recv() => {
                    if !self.engine.scheduler().is_current(&tick) {
                        debug!("stale tick dropped");
                        continue;
                    }
                    match self.engine.tick() {
                        Ok(event) => emit(event),
                        Err(e) => debug!(error = %e, "tick ignored"),
                    }
                }
            }
        }

        debug!("timer driver stopped");
        self.engine.state().clone()
    }
}
