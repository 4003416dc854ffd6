//! Within-tier retry with exponential back-off and jitter.
//!
//! [`retry_transient`] re-runs an adapter call while it keeps failing
//! transiently. Soft failures, hard failures and successes end the loop
//! immediately.

use std::future::Future;
use std::time::Duration;

use growthwatch_sources::AcquisitionAttempt;

const MAX_DELAY_MS: u64 = 60_000;

/// Per-tier call policy shared by every capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Upper bound on a single adapter call.
    pub tier_timeout: Duration,
    /// Additional attempts after a transient failure.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl TierPolicy {
    #[must_use]
    pub fn from_config(config: &growthwatch_core::AppConfig) -> Self {
        Self {
            tier_timeout: Duration::from_secs(config.tier_timeout_secs),
            max_retries: config.tier_max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// Delay before retry number `retry` (1-based).
///
/// Back-off schedule with `backoff_base_ms = 2_000`:
///
/// | Retry | Sleep before it                 |
/// |-------|---------------------------------|
/// | 1     | 2 000 ms × 2⁰ ± 25 % jitter    |
/// | 2     | 2 000 ms × 2¹ ± 25 % jitter    |
/// | 3     | 2 000 ms × 2² ± 25 % jitter    |
///
/// Capped at 60 s before jitter is applied.
#[must_use]
pub fn backoff_delay(retry: u32, backoff_base_ms: u64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let computed = backoff_base_ms.saturating_mul(1u64 << exponent);
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(delay_ms)
}

/// Runs `operation` until it does not fail transiently, up to
/// `policy.max_retries` extra times. Every attempt is returned in order; the
/// last one is final.
pub(crate) async fn retry_transient<T, F, Fut>(
    policy: &TierPolicy,
    mut operation: F,
) -> Vec<AcquisitionAttempt<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AcquisitionAttempt<T>>,
{
    let mut attempts = Vec::with_capacity(1);
    let mut retry = 0u32;
    loop {
        let attempt = operation().await;
        let again = attempt.is_transient_failure() && retry < policy.max_retries;
        if again {
            retry += 1;
            let delay = backoff_delay(retry, policy.backoff_base_ms);
            tracing::warn!(
                tier = attempt.tier,
                retry,
                max_retries = policy.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = attempt.detail().unwrap_or_default(),
                "transient failure, retrying after back-off"
            );
            attempts.push(attempt);
            tokio::time::sleep(delay).await;
        } else {
            attempts.push(attempt);
            return attempts;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use growthwatch_sources::{AttemptOutcome, SourceError};

    use super::*;

    fn policy(max_retries: u32) -> TierPolicy {
        TierPolicy {
            tier_timeout: Duration::from_secs(1),
            max_retries,
            backoff_base_ms: 0,
        }
    }

    fn transient() -> AcquisitionAttempt<String> {
        AcquisitionAttempt::from_result(
            "t",
            "m",
            Err(SourceError::UnexpectedStatus {
                service: "svc",
                status: 503,
            }),
            Duration::ZERO,
        )
    }

    fn hard() -> AcquisitionAttempt<String> {
        AcquisitionAttempt::from_result(
            "t",
            "m",
            Err(SourceError::Unauthorized { service: "svc" }),
            Duration::ZERO,
        )
    }

    #[test]
    fn backoff_is_capped_and_jittered() {
        for _ in 0..50 {
            let first = backoff_delay(1, 1_000).as_millis();
            assert!((750..=1_250).contains(&first), "got {first}");
            let huge = backoff_delay(30, 1_000).as_millis();
            assert!((45_000..=75_000).contains(&huge), "got {huge}");
        }
        assert_eq!(backoff_delay(3, 0), Duration::ZERO);
    }

    #[tokio::test]
    async fn success_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let attempts = retry_transient(&policy(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                AcquisitionAttempt::from_result("t", "m", Ok("x".to_owned()), Duration::ZERO)
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(attempts.len(), 1);
    }

    #[tokio::test]
    async fn hard_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let attempts = retry_transient(&policy(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                hard()
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "hard failures must not be retried");
        assert_eq!(attempts.len(), 1);
    }

    #[tokio::test]
    async fn transient_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let attempts = retry_transient(&policy(3), || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    transient()
                } else {
                    AcquisitionAttempt::from_result("t", "m", Ok("ok".to_owned()), Duration::ZERO)
                }
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(attempts.len(), 3);
        assert_eq!(
            attempts.last().map(|a| &a.outcome),
            Some(&AttemptOutcome::Success("ok".to_owned()))
        );
    }

    #[tokio::test]
    async fn transient_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let attempts = retry_transient(&policy(1), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                transient()
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(attempts.iter().all(AcquisitionAttempt::is_transient_failure));
    }
}
