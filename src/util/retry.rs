//! Repeating one completion call after transient backend failures.

use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::error::BackendError;

/// How often, and how patiently, a single completion call is repeated.
///
/// Only the HTTP call is repeated. A turn that still fails after the last
/// attempt is reported to the room, which skips the agent for the round.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included. Zero behaves like one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single wait.
    pub max_backoff: Duration,
    /// Growth factor applied to the wait after each failed attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Base wait before attempt `attempt + 1`, without jitter.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let grown = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(grown.min(self.max_backoff.as_secs_f64()))
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or
    /// the attempts run out. The last error is returned unchanged.
    ///
    /// A rate-limit hint from the backend stretches the wait, capped at
    /// `max_backoff`.
    pub async fn execute<F, Fut, T>(&self, mut call: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            attempt += 1;
            if attempt >= attempts || !err.is_retryable() {
                return Err(err);
            }

            let wait = self.wait_after(&err, attempt - 1);
            tracing::warn!(
                attempt,
                max_attempts = attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "completion call failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn wait_after(&self, err: &BackendError, attempt: u32) -> Duration {
        // 75%..125% of the base wait
        let jittered = self.backoff_for(attempt).mul_f64(0.75 + jitter() * 0.5);
        let hinted = match err {
            BackendError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            _ => Duration::ZERO,
        };
        jittered.max(hinted).min(self.max_backoff)
    }
}

/// Uniform-ish factor in `[0, 1)` from the random bits of a v4 uuid.
fn jitter() -> f64 {
    (Uuid::new_v4().as_u128() % 10_000) as f64 / 10_000.0
}
