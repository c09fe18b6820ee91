//! Retry with exponential back-off and jitter for provider calls.
//!
//! Only transient failures (timeouts, connection errors, 5xx, 429) are
//! retried. "Not found" and malformed responses are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::GeoError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &GeoError) -> bool {
    match err {
        GeoError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        GeoError::Provider(_)
        | GeoError::Deserialize { .. }
        | GeoError::NotFound(_)
        | GeoError::LocationUnavailable(_)
        | GeoError::Geolocation(_) => false,
    }
}

/// Longest single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Sleep before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped, then scaled by a jitter factor in `[0.75, 1.25)`.
fn backoff_delay(attempt: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    let capped = backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS);
    Duration::from_millis(capped).mul_f64(jitter.clamp(0.75, 1.25))
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GeoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeoError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }
        attempt += 1;
        let delay = backoff_delay(attempt, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "geo provider transient error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1, 500, 1.0), Duration::from_millis(500));
        assert_eq!(backoff_delay(3, 500, 1.0), Duration::from_millis(2000));
        assert_eq!(backoff_delay(20, 500, 1.0), Duration::from_millis(MAX_DELAY_MS));
    }

    #[test]
    fn backoff_jitter_stays_within_a_quarter() {
        assert_eq!(backoff_delay(1, 1000, 0.0), Duration::from_millis(750));
        assert_eq!(backoff_delay(1, 1000, 9.0), Duration::from_millis(1250));
    }

    #[test]
    fn not_found_is_not_retriable() {
        assert!(!is_retriable(&GeoError::NotFound("atlantis".to_owned())));
    }

    #[test]
    fn provider_error_is_not_retriable() {
        assert!(!is_retriable(&GeoError::Provider("NoRoute".to_owned())));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(GeoError::NotFound("nowhere".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(GeoError::NotFound(_))));
    }

    #[tokio::test]
    async fn retries_connect_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    let err = reqwest::Client::new()
                        .get("http://0.0.0.0:1")
                        .send()
                        .await
                        .unwrap_err();
                    Err::<u32, _>(GeoError::Http(err))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(1, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                let err = reqwest::Client::new()
                    .get("http://0.0.0.0:1")
                    .send()
                    .await
                    .unwrap_err();
                Err::<u32, _>(GeoError::Http(err))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
