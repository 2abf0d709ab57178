//! Jittered exponential backoff between generation attempts.

use std::time::Duration;

use rand::Rng;

use murmur_types::config::GenerationConfig;

/// Lower and upper jitter factors applied to the capped delay.
const JITTER_MIN: f64 = 0.75;
const JITTER_MAX: f64 = 1.25;

/// `min(base * 2^attempt, max) * U[0.75, 1.25]`, clamped to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay before the attempt after `attempt` (0-based), without jitter.
    pub fn capped_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        let factor = 2u64.saturating_pow(attempt);
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
    }

    /// Jittered delay for `attempt` (0-based). Never exceeds `max`.
    pub fn delay_for<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let capped = self.capped_delay(attempt);
        let jitter = rng.gen_range(JITTER_MIN..=JITTER_MAX);
        capped.mul_f64(jitter).min(self.max)
    }
}
