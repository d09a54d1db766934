//! Client-side rate limiter for Hyperliquid REST requests
//!
//! GCRA via the governor crate. Hyperliquid allows 1200 weighted requests per
//! minute per IP; requests beyond the quota wait in line for up to 30 seconds.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

const MAX_REQUESTS_PER_MINUTE: u32 = 1200;

const QUEUE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum RateLimiterError {
    #[error("Rate limit queue timeout after {0}s")]
    QueueTimeout(u64),
}

pub struct RateLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    queue_timeout: Duration,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("queue_timeout", &self.queue_timeout)
            .finish()
    }
}

impl RateLimiter {
    /// 1200 requests/minute, 30 second queue timeout
    pub fn new() -> Self {
        Self::with_quota(MAX_REQUESTS_PER_MINUTE, QUEUE_TIMEOUT_SECS)
    }

    pub fn with_quota(requests_per_minute: u32, queue_timeout_secs: u64) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: GovernorRateLimiter::direct(Quota::per_minute(per_minute)),
            queue_timeout: Duration::from_secs(queue_timeout_secs),
        }
    }

    /// Waits for a permit, failing after the queue timeout
    pub async fn wait(&self) -> Result<(), RateLimiterError> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        warn!("Rate limit reached, queueing request");

        let queued = timeout(self.queue_timeout, async {
            loop {
                if self.limiter.check().is_ok() {
                    debug!("Rate limit permission granted");
                    return;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        queued.map_err(|_| {
            warn!(
                timeout_secs = self.queue_timeout.as_secs(),
                "Rate limit queue timeout exceeded"
            );
            RateLimiterError::QueueTimeout(self.queue_timeout.as_secs())
        })
    }

    /// Non-blocking check; consumes a permit when one is available
    pub fn check_immediate(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
