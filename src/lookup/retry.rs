//! Retry-on-failure policy for lookups

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::error::{Result, SniperError};
use crate::types::{ClaimedProfile, LookupOutcome};

/// Whether a lookup result settles the question or has to be retried
pub trait Definitive {
    fn is_definitive(&self) -> bool {
        true
    }
}

impl Definitive for LookupOutcome {
    fn is_definitive(&self) -> bool {
        !matches!(self, LookupOutcome::Indeterminate)
    }
}

impl Definitive for Vec<ClaimedProfile> {}

/// Fixed-interval retry, optionally capped and with geometric backoff.
///
/// The default retries every second until a definitive answer arrives,
/// with no cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
    backoff_factor: f64,
    max_delay: Duration,
    jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            max_attempts: None,
            backoff_factor: 1.0,
            max_delay: Duration::from_millis(1000),
            jitter: 0.0,
        }
    }
}

impl RetryPolicy {
    /// Unbounded fixed-interval retry with a custom delay
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_delay: delay,
            ..Self::default()
        }
    }

    /// A single attempt, failures are returned as-is
    pub fn once() -> Self {
        Self {
            max_attempts: Some(1),
            ..Self::default()
        }
    }

    /// Cap the number of attempts; 0 is treated as 1
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Multiply the delay by `factor` after every failure, up to `max_delay`
    pub fn with_backoff(mut self, factor: f64, max_delay: Duration) -> Self {
        self.backoff_factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
        self.max_delay = max_delay.max(self.delay);
        self
    }

    /// Add up to `fraction` of the current delay as random jitter
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Run `op` until it yields a definitive result.
    ///
    /// Transient errors and non-definitive results are retried after the
    /// current delay; any other error is returned at once. When the attempt
    /// cap is hit, a single-attempt policy returns the original error;
    /// otherwise `RetriesExhausted` is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        T: Definitive,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        let mut delay = self.delay;

        loop {
            attempt = attempt.saturating_add(1);

            let last_error = match op().await {
                Ok(value) if value.is_definitive() => return Ok(value),
                Ok(_) => SniperError::parse(format!("indeterminate response to {}", operation), None),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    if max == 1 {
                        return Err(last_error);
                    }
                    return Err(SniperError::retries_exhausted(
                        operation,
                        attempt,
                        last_error.to_string(),
                    ));
                }
            }

            let wait = delay + self.jitter_for(delay);
            tracing::warn!(
                operation = %operation,
                attempt = attempt,
                error = %last_error,
                retry_in_ms = %wait.as_millis(),
                "Lookup failed, retrying"
            );
            tokio::time::sleep(wait).await;

            delay = self.next_delay(delay);
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        if self.backoff_factor <= 1.0 {
            return current;
        }
        current.mul_f64(self.backoff_factor).min(self.max_delay)
    }

    fn jitter_for(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return Duration::ZERO;
        }
        let fraction = rand::thread_rng().gen_range(0.0..=self.jitter);
        delay.mul_f64(fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_definitive() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let started = Instant::now();

        let outcome = policy
            .run("profile lookup", || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(SniperError::network("connection reset", None, None)),
                    1 => Ok(LookupOutcome::Indeterminate),
                    _ => Ok(LookupOutcome::NotFound),
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome, LookupOutcome::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two fixed one-second waits, no growth
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_definitive_results_return_immediately() {
        let policy = RetryPolicy::default();
        let started = Instant::now();
        let profile = ClaimedProfile {
            name: "Notch".to_string(),
            id: "069a79f4".to_string(),
        };

        let outcome = policy
            .run("profile lookup", || async { Ok(LookupOutcome::Found(profile.clone())) })
            .await
            .unwrap();

        assert_eq!(outcome, LookupOutcome::Found(profile));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_retry_keeps_going() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(Duration::from_millis(10));

        let outcome = policy
            .run("profile lookup", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 500 {
                    Ok(LookupOutcome::Indeterminate)
                } else {
                    Ok(LookupOutcome::NotFound)
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome, LookupOutcome::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 501);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_exhausted() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default().with_max_attempts(3);

        let err = policy
            .run("profile lookup", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<LookupOutcome, _>(SniperError::rate_limit("too many requests", None))
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            SniperError::RetriesExhausted { attempts, last_error, .. } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("too many requests"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_once_returns_original_error() {
        let err = RetryPolicy::once()
            .run("bulk lookup", || async {
                Err::<Vec<ClaimedProfile>, _>(SniperError::network("offline", None, None))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SniperError::Network { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let err = RetryPolicy::default()
            .run("bulk lookup", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<ClaimedProfile>, _>(SniperError::validation("too many names"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SniperError::Validation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_growth_is_capped() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(Duration::from_millis(100))
            .with_backoff(2.0, Duration::from_millis(300))
            .with_max_attempts(5);
        let started = Instant::now();

        let _ = policy
            .run("profile lookup", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(LookupOutcome::Indeterminate)
            })
            .await;

        // 100 + 200 + 300 + 300
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(900) && elapsed < Duration::from_millis(950));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let policy = RetryPolicy::default().with_jitter(0.5);
        for _ in 0..100 {
            let jitter = policy.jitter_for(Duration::from_millis(1000));
            assert!(jitter <= Duration::from_millis(500));
        }
        assert_eq!(RetryPolicy::default().jitter_for(Duration::from_secs(1)), Duration::ZERO);
    }
}
