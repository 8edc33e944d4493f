//! Repeating wall-clock timer.
//!
//! The frame loop feeds it real elapsed time, so the cadence does not depend
//! on the frame rate.  It fires at most once per `tick`: after a long stall
//! the backlog is folded into the next period instead of firing in a burst.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatingTimer {
    period: Duration,
    elapsed: Duration,
    cancelled: bool,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            cancelled: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated towards the next firing.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Stop firing for good.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `delta`; returns whether the timer fired.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.cancelled || self.period.is_zero() {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed < self.period {
            return false;
        }
        let rest = self.elapsed - self.period;
        self.elapsed = if rest < self.period {
            rest
        } else {
            Duration::from_nanos((rest.as_nanos() % self.period.as_nanos()) as u64)
        };
        true
    }
}
