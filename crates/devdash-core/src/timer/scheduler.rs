//! Tick scheduling seam.
//!
//! The engine never owns a thread or a timer handle directly. It arms and
//! disarms a [`TickScheduler`]; whoever owns the scheduler is responsible for
//! calling [`TimerEngine::tick`](super::TimerEngine::tick) once per period
//! while it is armed. Tests use [`ManualScheduler`] and tick synchronously.

/// Periodic tick source controlled by the timer engine.
pub trait TickScheduler: Send {
    /// Begin delivering ticks. Arming an armed scheduler is a no-op.
    fn arm(&mut self);

    /// Stop delivering ticks. No tick may be observed after this returns.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

/// Scheduler that only records arm/disarm calls.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    armed: bool,
    arm_count: u32,
    disarm_count: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }

    pub fn disarm_count(&self) -> u32 {
        self.disarm_count
    }
}

impl TickScheduler for ManualScheduler {
    fn arm(&mut self) {
        if !self.armed {
            self.armed = true;
            self.arm_count += 1;
        }
    }

    fn disarm(&mut self) {
        if self.armed {
            self.armed = false;
            self.disarm_count += 1;
        }
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_is_idempotent() {
        let mut s = ManualScheduler::new();
        s.arm();
        s.arm();
        assert!(s.is_armed());
        assert_eq!(s.arm_count(), 1);
        s.disarm();
        s.disarm();
        assert!(!s.is_armed());
        assert_eq!(s.disarm_count(), 1);
    }
}
