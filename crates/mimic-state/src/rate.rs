//! Sampling rate limiter
//!
//! Frame-rate independent gate: the accumulator counts down by elapsed time
//! and fires once when it reaches zero, then re-arms to one full interval.
//! Surplus time in a long frame is discarded, never turned into extra ticks.

use std::time::Duration;

use mimic_core::{MimicError, MimicResult};

/// Default sampling rate
pub const DEFAULT_UPDATES_PER_SECOND: f32 = 9.0;

/// Single-shot countdown rate limiter
#[derive(Clone, Debug)]
pub struct RateLimiter {
    /// Time between sampling passes
    interval: Duration,
    /// Time left until the next pass
    remaining: Duration,
}

impl RateLimiter {
    /// Create a limiter firing `updates_per_second` times per second.
    /// The first call to [`RateLimiter::tick`] always fires.
    pub fn new(updates_per_second: f32) -> MimicResult<Self> {
        let interval = Self::interval_for(updates_per_second)?;
        Ok(RateLimiter {
            interval,
            remaining: Duration::ZERO,
        })
    }

    /// Interval for a rate, rejecting non-positive and non-finite rates
    pub fn interval_for(updates_per_second: f32) -> MimicResult<Duration> {
        if !updates_per_second.is_finite() || updates_per_second <= 0.0 {
            return Err(MimicError::InvalidConfig(format!(
                "updates_per_second must be positive, got {updates_per_second}"
            )));
        }

        Duration::try_from_secs_f64(1.0 / updates_per_second as f64)
            .map_err(|e| MimicError::InvalidConfig(format!("sampling interval: {e}")))
    }

    /// Advance by `dt`. Returns true when a sampling pass is allowed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        if !self.remaining.is_zero() {
            return false;
        }
        self.remaining = self.interval;
        true
    }

    /// Re-arm so the next tick fires
    pub fn reset(&mut self) {
        self.remaining = Duration::ZERO;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter {
            interval: Duration::from_secs_f64(1.0 / DEFAULT_UPDATES_PER_SECOND as f64),
            remaining: Duration::ZERO,
        }
    }
}
