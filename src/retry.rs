//! Retry policy for transient upstream failures
//!
//! A policy bundles the attempt budget, the delay between attempts and the
//! set of HTTP statuses considered transient. Callers pass a predicate so the
//! same loop can serve error types other than [`ApiError`].

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Default attempt budget for commit lookups
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Delay schedule between attempts
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * factor^(attempt - 1)`, capped at `max`
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, factor, max } => {
                let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = base.as_secs_f64() * factor.powi(exp);
                if secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::try_from_secs_f64(secs).unwrap_or(*max)
                }
            }
        }
    }
}

/// Bounded retry with a configurable backoff and retryable-status set
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// HTTP statuses that trigger another attempt
    pub retry_on: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
            // GitHub signals its secondary rate limit with 403
            retry_on: vec![403],
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration, retry_on: Vec<u16>) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
            retry_on,
        }
    }

    /// Whether `status` is in the retryable set
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_on.contains(&status)
    }

    /// Whether an API error is worth another attempt
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        error
            .status()
            .is_some_and(|status| self.is_retryable_status(status))
    }

    /// Whether another attempt may follow the given (1-based) failed attempt
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_retryable_status(status)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    /// The last error is returned on failure.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }

                    let wait = self.backoff.delay(attempt);
                    tracing::debug!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        max_attempts,
                        err,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// [`RetryPolicy::run`] specialised to [`ApiError`] and this policy's status set
    pub async fn run_api<T, F, Fut>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(op, |err| self.is_retryable(err)).await
    }
}
