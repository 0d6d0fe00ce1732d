//! Fixed delays with optional jitter, and the sleep seam.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Delay before the next attempt: `base` plus up to `jitter_ratio * base`.
pub fn retry_delay(base: Duration, jitter_ratio: f64) -> Duration {
    let base_ms = base.as_millis() as u64;
    let jitter_range = (base_ms as f64 * jitter_ratio.clamp(0.0, 1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(base_ms + jitter)
}

/// Suspends the current task. Tests substitute a recording fake.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
