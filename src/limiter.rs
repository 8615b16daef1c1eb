//! Rate limiting at the ingestion boundary

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::debug;

/// Admission gate invoked once per ingested item, before buffering.
///
/// `acquire` may suspend the caller indefinitely; this is the producer-side
/// backpressure point ahead of the push queue. The generator only invokes the
/// limiter, it never implements admission policy itself.
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync + 'static {
    /// Wait until one item may be admitted
    async fn acquire(&self);
}

/// Limiter that admits every item immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait::async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// Limiter that paces admissions to a fixed rate.
///
/// Uses "delay" semantics - a backlog of producers does not burst after a
/// stall, each admission still waits out the pacing interval.
pub struct FixedRate {
    interval: tokio::sync::Mutex<Interval>,
}

impl FixedRate {
    /// Create a limiter admitting at most `per_second` items per second
    pub fn new(per_second: u32) -> Self {
        let per_second = per_second.max(1);
        let pace = Duration::from_secs_f64(1.0 / per_second as f64);

        let mut interval = interval(pace);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Fixed rate limiter created ({}/s)", per_second);
        Self { interval: tokio::sync::Mutex::new(interval) }
    }
}

#[async_trait::async_trait]
impl RateLimiter for FixedRate {
    async fn acquire(&self) {
        // Serializes concurrent producers through one pacing interval
        self.interval.lock().await.tick().await;
    }
}
