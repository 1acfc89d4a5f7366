//! Retry engine: bounded attempts with a linearly growing inter-attempt
//! delay.
//!
//! The schedule is uniform across failure classes — a service-side error
//! payload spends an attempt exactly like a transport failure.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use scanfill_core::ScanfillError;

/// Retry policy: attempt ceiling and base delay. The wait before attempt
/// `n + 1` is `base_delay × n`, strictly increasing.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after a failed attempt `attempt_number` (1-indexed).
    pub fn delay_for(&self, attempt_number: u32) -> Duration {
        self.base_delay * attempt_number
    }

    pub fn should_retry(&self, attempt_number: u32) -> bool {
        attempt_number < self.max_attempts
    }
}

impl From<&scanfill_core::RecognitionPolicy> for RetryPolicy {
    fn from(policy: &scanfill_core::RecognitionPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts.max(1),
            base_delay: Duration::from_millis(policy.retry_base_delay_ms),
        }
    }
}

/// Drive `attempt_fn` under the policy. Attempts are strictly sequential;
/// exhaustion surfaces the last error unchanged.
pub async fn run_attempts<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt_fn: F,
) -> Result<T, ScanfillError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScanfillError>>,
{
    let mut last_error = None;
    for attempt in 1..=policy.max_attempts.max(1) {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    attempt,
                    max = policy.max_attempts,
                    error = %err,
                    "Recognition attempt failed"
                );
                let spend_another = err.retryable() && policy.should_retry(attempt);
                last_error = Some(err);
                if !spend_another {
                    break;
                }
                tokio::time::sleep(policy.delay_for(attempt)).await;
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ScanfillError::RecognitionTransport("no attempts were made".into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
        }
    }

    #[test]
    fn delays_grow_strictly_linearly() {
        let policy = policy(3, 2_000);
        let d1 = policy.delay_for(1);
        let d2 = policy.delay_for(2);
        assert_eq!(d1, Duration::from_millis(2_000));
        assert_eq!(d2, Duration::from_millis(4_000));
        assert!(d2 > d1);
    }

    #[test]
    fn exhaustion_after_max_attempts() {
        let policy = policy(3, 1);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sustained_failure_spends_exactly_the_attempt_ceiling() {
        let policy = policy(3, 1_000);
        let mut calls = 0u32;
        let result: Result<(), _> = run_attempts(&policy, |attempt| {
            calls += 1;
            async move {
                Err(ScanfillError::RecognitionTransport(format!(
                    "attempt {attempt} refused"
                )))
            }
        })
        .await;

        assert_eq!(calls, 3);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("attempt 3 refused"), "{err}");
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_linear_schedule_between_attempts() {
        let policy = policy(3, 1_000);
        let started = tokio::time::Instant::now();
        let _: Result<(), _> = run_attempts(&policy, |_| async {
            Err(ScanfillError::RecognitionTransport("down".into()))
        })
        .await;
        // 1s after the first failure, 2s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn success_stops_the_schedule() {
        let policy = policy(3, 1_000);
        let mut calls = 0u32;
        let result = run_attempts(&policy, |attempt| {
            calls += 1;
            async move {
                if attempt < 2 {
                    Err(ScanfillError::RecognitionApplication("status 500".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_stop_immediately() {
        let policy = policy(3, 1_000);
        let mut calls = 0u32;
        let result: Result<(), _> = run_attempts(&policy, |_| {
            calls += 1;
            async { Err(ScanfillError::Page("evaluate failed".into())) }
        })
        .await;

        assert_eq!(calls, 1);
        assert!(matches!(result.unwrap_err(), ScanfillError::Page(_)));
    }
}
