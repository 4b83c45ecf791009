//! Retry with exponential back-off and jitter for the geocoding client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, `OVER_QUERY_LIMIT`). Everything
//! else is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::GeocodeError;

/// Google's rate-limit status; clears after a short wait.
const OVER_QUERY_LIMIT: &str = "OVER_QUERY_LIMIT";

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused or reset.
/// - HTTP 5xx responses.
/// - `OVER_QUERY_LIMIT` from the API.
///
/// **Not retriable:**
/// - [`GeocodeError::NoResults`]: the address will not start matching.
/// - Any other [`GeocodeError::Api`] status, e.g. `REQUEST_DENIED`.
/// - [`GeocodeError::Deserialize`], [`GeocodeError::InvalidAddress`] and
///   [`GeocodeError::InvalidBaseUrl`].
pub(crate) fn is_retriable(err: &GeocodeError) -> bool {
    match err {
        GeocodeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GeocodeError::Api { status, .. } => status == OVER_QUERY_LIMIT,
        GeocodeError::NoResults { .. }
        | GeocodeError::Deserialize { .. }
        | GeocodeError::InvalidAddress
        | GeocodeError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// With `backoff_base_ms = 500` the n-th retry sleeps `500 ms × 2ⁿ⁻¹`, scaled
/// by a random factor in `[0.75, 1.25)`. Delay is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GeocodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "geocoder transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
