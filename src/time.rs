//! Wall-clock timing of simulation steps.
//!
//! Steps are discrete and carry no simulated time; this only measures how
//! long they take on the host, for log output.
//!
//! ```ignore
//! let mut timer = StepTimer::new();
//! for _ in 0..steps {
//!     agents = step.advance(&agents)?;
//!     timer.tick();
//! }
//! println!("{:.1} steps/s", timer.steps_per_second());
//! ```

use std::time::{Duration, Instant};

/// Step counter with elapsed time and a periodically refreshed rate.
#[derive(Debug)]
pub struct StepTimer {
    start: Instant,
    last_step: Instant,
    /// Duration of the most recent step.
    last_duration: Duration,
    step_count: u64,
    /// Steps per second, refreshed every `rate_interval`.
    rate: f64,
    rate_step_count: u64,
    rate_update_time: Instant,
    rate_interval: Duration,
}

impl StepTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_step: now,
            last_duration: Duration::ZERO,
            step_count: 0,
            rate: 0.0,
            rate_step_count: 0,
            rate_update_time: now,
            rate_interval: Duration::from_millis(500),
        }
    }

    /// Mark the end of a step. Returns that step's duration.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.last_duration = now.duration_since(self.last_step);
        self.last_step = now;
        self.step_count += 1;

        let since_rate = now.duration_since(self.rate_update_time);
        if since_rate >= self.rate_interval {
            let steps = self.step_count - self.rate_step_count;
            self.rate = steps as f64 / since_rate.as_secs_f64();
            self.rate_step_count = self.step_count;
            self.rate_update_time = now;
        }

        self.last_duration
    }

    /// Steps recorded so far.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.step_count
    }

    /// Time since the timer was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn last_step_duration(&self) -> Duration {
        self.last_duration
    }

    /// Steps per second over the last refresh interval, or over the whole
    /// run if no interval has completed yet.
    pub fn steps_per_second(&self) -> f64 {
        if self.rate > 0.0 {
            return self.rate;
        }
        let secs = self.last_step.duration_since(self.start).as_secs_f64();
        if secs > 0.0 {
            self.step_count as f64 / secs
        } else {
            0.0
        }
    }

    /// Change how often the rate is refreshed.
    pub fn set_rate_interval(&mut self, interval: Duration) {
        self.rate_interval = interval;
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}
