use std::time::Duration;

use crate::constants::FIXED_TIMESTEP;

/// Frame-time accumulator that fires at most one fixed step per frame.
///
/// Long frames are not caught up on; the surplus stays in the accumulator.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    interval: Duration,
    accumulator: Duration,
    /// Simulated time, advanced by one interval per step.
    elapsed: Duration,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(Duration::from_secs_f32(FIXED_TIMESTEP))
    }
}

impl FixedStepClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Adds `frame_dt`; returns whether a step is due and, if so, consumes one interval.
    pub fn advance(&mut self, frame_dt: Duration) -> bool {
        self.accumulator += frame_dt;
        if self.accumulator > self.interval {
            self.accumulator -= self.interval;
            self.elapsed += self.interval;
            true
        } else {
            false
        }
    }
}
