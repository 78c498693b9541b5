// Transient-retry wrapper for slow remote calls
use crate::application::constants::{DEFAULT_RETRY_DELAY, DEFAULT_RETRY_MAX_ATTEMPTS};
use crate::port::InferenceError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry decision for one failed attempt
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then call again
    Retry(Duration),
    /// Transient failure on the last allowed attempt
    Exhausted,
    /// Non-transient failure, hand it back untouched
    Propagate,
}

/// Fixed-delay retry policy
///
/// Only failures tagged [`FailureKind::Transient`](crate::port::FailureKind::Transient)
/// are retried. There is no exponential growth: every retry waits the same
/// `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first call (clamped to at least 1)
    /// * `delay` - Fixed wait between attempts
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decide what to do after `attempt` (1-based) failed with `error`
    pub fn decide(&self, attempt: u32, error: &InferenceError) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::Propagate;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry(self.delay)
    }

    /// Run `call` until it succeeds, fails terminally, or the budget runs out
    ///
    /// # Errors
    /// - The original error, untouched, for any non-transient failure
    /// - `RetryExhausted` when every attempt failed transiently
    ///
    /// # Example
    /// ```text
    /// let caption = policy
    ///     .attempt("caption", || generator.generate_caption(request))
    ///     .await?;
    /// ```
    pub async fn attempt<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, InferenceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InferenceError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match self.decide(attempt, &error) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        operation = %operation,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Service unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Exhausted => {
                    warn!(
                        operation = %operation,
                        attempts = attempt,
                        "Max retry attempts reached"
                    );
                    return Err(InferenceError::retry_exhausted(attempt, &error));
                }
                RetryDecision::Propagate => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::FailureKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails transiently `k` times, then returns the attempt number
    async fn run_with_transient_failures(k: u32) -> (Result<u32, InferenceError>, u32) {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::default()
            .attempt("test", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= k {
                    Err(InferenceError::transient("503 Service Unavailable"))
                } else {
                    Ok(n)
                }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_attempt() {
        let (result, calls) = run_with_transient_failures(0).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_below_budget() {
        for k in 1..3 {
            let (result, calls) = run_with_transient_failures(k).await;
            assert_eq!(result.unwrap(), k + 1);
            assert_eq!(calls, k + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_exactly_three_attempts() {
        for k in [3, 4, 10] {
            let (result, calls) = run_with_transient_failures(k).await;
            let err = result.unwrap_err();
            assert_eq!(err.kind, FailureKind::RetryExhausted);
            assert!(err.message.contains("3 attempts"));
            assert_eq!(calls, 3);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let start = tokio::time::Instant::now();
        let (result, _) = run_with_transient_failures(2).await;
        assert!(result.is_ok());
        // Two retries, 1s each, no growth
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_never_retried() {
        for error in [
            InferenceError::rejected("400 Bad Request"),
            InferenceError::schema_violation("theme 'Rainy' not allowed"),
        ] {
            let calls = AtomicU32::new(0);
            let result: Result<(), _> = RetryPolicy::default()
                .attempt("test", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let error = error.clone();
                    async move { Err(error) }
                })
                .await;
            assert_eq!(result.unwrap_err(), error);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.decide(1, &InferenceError::transient("503")),
            RetryDecision::Exhausted
        );
    }
}
