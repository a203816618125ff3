//! Bounded retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::defaults::{
    TAG_SYNC_INITIAL_BACKOFF_MS, TAG_SYNC_MAX_ATTEMPTS, TAG_SYNC_MAX_BACKOFF_MS,
};
use crate::error::Result;

/// How many times to try an idempotent operation and how long to wait
/// between tries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Zero is treated as one.
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles each time after.
    pub initial_backoff: Duration,
    /// Cap on a single sleep.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: TAG_SYNC_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(TAG_SYNC_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(TAG_SYNC_MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Sleep before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or the attempt budget is spent. The last error is returned unchanged.
    pub async fn run<F, Fut, T>(&self, op_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            op = op_name,
                            attempt,
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if !err.is_transient() || attempt >= max_attempts {
                        return Err(err);
                    }
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        op = op_name,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Transient store failure, will retry after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
