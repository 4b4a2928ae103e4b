//! Retry policy for the listings backend call.
//!
//! Only transport-level failures are retried. A backend that answers with
//! `success: false`, or with a body that does not decode, gets the same
//! answer on a second try, so those errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SearchError;

const MAX_DELAY_MS: u64 = 5_000;

/// Returns `true` for timeouts, connection failures and 5xx responses.
pub(crate) fn is_retriable(err: &SearchError) -> bool {
    match err {
        SearchError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SearchError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        SearchError::Backend(_)
        | SearchError::Deserialize { .. }
        | SearchError::InvalidBaseUrl { .. } => false,
    }
}

/// How many extra attempts a nearby query gets, and how long to wait between
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), before jitter:
    /// `base * 2^(retry-1)`, capped at 5 s.
    fn nominal_delay_ms(self, retry: u32) -> u64 {
        let doubling = retry.saturating_sub(1).min(10);
        self.backoff_base_ms
            .saturating_mul(1u64 << doubling)
            .min(MAX_DELAY_MS)
    }

    /// `jitter` in `[0, 1)` scales the nominal delay into `[0.75, 1.25)`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn delay(self, retry: u32, jitter: f64) -> Duration {
        let scaled = self.nominal_delay_ms(retry) as f64 * (0.75 + jitter * 0.5);
        Duration::from_millis(scaled as u64)
    }

    /// Runs `attempt` until it succeeds, fails permanently, or the retries
    /// run out. `endpoint` only labels the log lines.
    pub(crate) async fn run<T, F, Fut>(self, endpoint: &str, mut attempt: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let mut retry = 0u32;
        let err = loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if is_retriable(&err) && retry < self.max_retries => err,
                Err(err) => break err,
            };
            retry += 1;
            let delay = self.delay(retry, rand::random::<f64>());
            tracing::warn!(
                endpoint,
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "nearby query failed transiently; backing off"
            );
            tokio::time::sleep(delay).await;
        };
        if retry > 0 {
            tracing::debug!(endpoint, retry, "nearby query gave up after retrying");
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn server_error() -> SearchError {
        SearchError::UnexpectedStatus {
            status: 503,
            url: "http://backend.test/api/nearby-houses".to_owned(),
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let p = RetryPolicy {
            max_retries: 20,
            backoff_base_ms: 250,
        };
        assert_eq!(p.nominal_delay_ms(1), 250);
        assert_eq!(p.nominal_delay_ms(2), 500);
        assert_eq!(p.nominal_delay_ms(3), 1_000);
        assert_eq!(p.nominal_delay_ms(6), MAX_DELAY_MS);
        assert_eq!(p.nominal_delay_ms(30), MAX_DELAY_MS);
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let p = RetryPolicy {
            max_retries: 1,
            backoff_base_ms: 400,
        };
        assert_eq!(p.delay(1, 0.0), Duration::from_millis(300));
        assert_eq!(p.delay(1, 0.5), Duration::from_millis(400));
        assert!(p.delay(1, 0.999) < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn transient_error_then_success() {
        let calls = Cell::new(0u32);
        let result = policy(2)
            .run("test", || {
                calls.set(calls.get() + 1);
                let first = calls.get() == 1;
                async move {
                    if first {
                        Err(server_error())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn stops_after_configured_retries() {
        let calls = Cell::new(0u32);
        let result = policy(2)
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(server_error()) }
            })
            .await;
        assert_eq!(calls.get(), 3);
        assert!(matches!(result, Err(SearchError::UnexpectedStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = Cell::new(0u32);
        let result = policy(3)
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(SearchError::Backend("invalid coordinates".into())) }
            })
            .await;
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(SearchError::Backend(_))));
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let calls = Cell::new(0u32);
        let _ = policy(0)
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(server_error()) }
            })
            .await;
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn only_transient_statuses_are_retriable() {
        let not_found = SearchError::UnexpectedStatus {
            status: 404,
            url: "http://backend.test".into(),
        };
        assert!(!is_retriable(&not_found));
        assert!(is_retriable(&server_error()));
    }
}
