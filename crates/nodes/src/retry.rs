//! Bounded exponential back-off around a single network call.
//!
//! Whether a failure is retried is decided by [`PipelineError::retry_policy`];
//! this module only schedules attempts.

use std::future::Future;
use std::time::Duration;

use pipeline::{PipelineError, RetryPolicy};

/// Retry schedule for the Query and Insight network calls.
///
/// The default performs a single attempt (`max_retries == 0`).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        if current >= self.max_delay {
            return self.max_delay;
        }
        let scaled = current.as_secs_f64() * self.backoff_multiplier.max(1.0);
        Duration::from_secs_f64(scaled).min(self.max_delay)
    }
}

/// Runs `operation`, re-issuing it while it fails with a retryable error and
/// attempts remain. A `Retry-After` hint carried by the error raises the wait
/// to at least that long.
pub async fn execute_with_retry<T, Op, Fut>(
    config: &RetryConfig,
    operation_name: &'static str,
    mut operation: Op,
) -> Result<T, PipelineError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt: u32 = 0;
    let mut delay = config.initial_delay;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let hint = match error.retry_policy() {
            RetryPolicy::Retryable { after } if attempt < config.max_retries => after,
            _ => return Err(error),
        };

        attempt += 1;
        let wait = hint.map_or(delay, |after| after.max(delay));
        tracing::warn!(
            operation = operation_name,
            attempt,
            max_retries = config.max_retries,
            delay_ms = wait.as_millis() as u64,
            error = %error,
            "Retryable failure; retrying"
        );
        tokio::time::sleep(wait).await;
        delay = config.next_delay(delay);
    }
}
