//! Retry with exponential back-off and jitter for catalog page fetches.
//!
//! Only transient transport faults are retried. A lookup is interactive, so
//! the configured retry count is small and the delay is capped low.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 5_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: timeouts, connection failures, and HTTP 5xx responses.
/// Everything else (4xx, empty documents, bad URLs) would fail the same way again.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ScraperError::EmptyDocument { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::InvalidSite { .. }
        | ScraperError::InvalidSelector { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// With `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retry < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retry += 1;
        let delay = backoff_delay(backoff_base_ms, retry, rand::random::<f64>());
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(MAX_DELAY_MS),
            error = %err,
            "catalog fetch failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Delay before the `retry`-th retry: `base_ms * 2^(retry-1)` capped at 5 s,
/// scaled by a jitter factor in `[0.75, 1.25)` drawn from `unit` in `[0, 1)`.
fn backoff_delay(base_ms: u64, retry: u32, unit: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let capped = base_ms.saturating_mul(1 << exponent).min(MAX_DELAY_MS);
    #[allow(clippy::cast_precision_loss)]
    Duration::from_secs_f64(capped as f64 / 1_000.0).mul_f64(0.75 + unit * 0.5)
}
