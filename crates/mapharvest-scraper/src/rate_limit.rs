//! Retry utilities for photo downloads.
//!
//! Provides exponential backoff retry logic for transient HTTP errors such as
//! 429 or 5xx responses and dropped connections. Everything else is
//! propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::DownloadError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`DownloadError::Http`] — network-level failure (connection reset, timeout, etc.).
/// - [`DownloadError::UnexpectedStatus`] with 429 or any 5xx status.
///
/// Non-retriable errors (propagated immediately):
/// - other [`DownloadError::UnexpectedStatus`] values (404, 403, ...).
/// - [`DownloadError::Io`] — the local file could not be written.
fn is_retriable(err: &DownloadError) -> bool {
    match err {
        DownloadError::Http(_) => true,
        DownloadError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        DownloadError::Io { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base * 2^attempt`
/// and tries again, up to `max_retries` additional attempts after the first
/// try. If all retries are exhausted the last error is returned.
///
/// With `max_retries = 2` the operation is attempted at most 3 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, DownloadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
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

        let delay = backoff_base.saturating_mul(1u32 << attempt.min(31));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient download error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
