mod clock;
mod engine;
mod phase;
mod scheduler;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{TimerEngine, TimerOptions, TimerState, TimerStatus};
pub use phase::{PhaseDurations, SessionPhase};
pub use scheduler::{ManualScheduler, TickScheduler};
