/*!
 * Exponential backoff with jitter.
 *
 * The delay before retry `n` (1-based) is
 * `min(max, initial * multiplier^(n-1))`, scaled by a random factor in
 * `1 ± jitter`. The base delay depends only on the attempt number, so the
 * jitter of one attempt never feeds into the next.
 */

use rand::Rng;
use std::time::Duration;

/// Backoff parameters used between retries of a single request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub initial: Duration,
    /// Upper bound for the un-jittered delay
    pub max: Duration,
    /// Growth factor per attempt
    pub multiplier: f64,
    /// Relative jitter, 0.23 means ±23%
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(120),
            multiplier: 1.6,
            jitter: 0.23,
        }
    }
}

impl BackoffPolicy {
    /// Policy without jitter, for deterministic delays
    pub fn without_jitter(self) -> Self {
        Self { jitter: 0.0, ..self }
    }

    /// Un-jittered delay for the given attempt (1-based), capped at `max`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        let max_secs = self.max.as_secs_f64();

        if !secs.is_finite() || secs > max_secs {
            self.max
        } else if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Jittered delay for the given attempt, drawing randomness from `rng`
    pub fn delay_with<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter <= 0.0 || base.is_zero() {
            return base;
        }

        let factor = 1.0 + self.jitter * rng.random_range(-1.0..=1.0);
        base.mul_f64(factor.max(0.0))
    }

    /// Jittered delay for the given attempt using the thread-local generator
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, &mut rand::rng())
    }

    /// Largest delay this policy can ever produce
    pub fn upper_bound(&self) -> Duration {
        self.max.mul_f64(1.0 + self.jitter.max(0.0))
    }
}
