//! Bounded retry loop with exponential backoff and cancellation.

use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use super::transport::HttpTransport;

/// Default retry budget when the caller has no opinion.
pub const DEFAULT_MAX_TRIES: usize = 3;

/// Terminal errors produced by the fetch loop itself.
#[derive(Debug)]
pub enum FetchError {
    /// `max_tries` below the required minimum of 2.
    InvalidMaxTries(usize),
    /// Response status outside the 200-299 success range.
    Status(StatusCode),
    /// The cancellation token fired during a backoff wait or an in-flight
    /// request.
    Cancelled,
    /// The attempt loop finished with neither a success nor a recorded
    /// failure. Unreachable under the contract.
    NoOutcome,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidMaxTries(n) => {
                write!(f, "max_tries must be at least 2, got {}", n)
            }
            FetchError::Status(status) => {
                write!(f, "Unsuccessful response status: {}", status)
            }
            FetchError::Cancelled => {
                write!(f, "Fetch cancelled")
            }
            FetchError::NoOutcome => {
                write!(f, "Fetch loop ended without an outcome")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Pause before retry number `attempt` (1-based): 1, 2, 4, 8, ... seconds.
/// Saturates at `u64::MAX` seconds once the doubling exceeds the shift width.
fn backoff_delay(attempt: usize) -> Duration {
    let exp = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
    Duration::from_secs(1u64.checked_shl(exp).unwrap_or(u64::MAX))
}

/// Fetches `url` as a string via `transport`, retrying failed attempts with
/// exponentially growing pauses.
///
/// Makes up to `max_tries + 1` attempts in total: one initial try plus
/// `max_tries` retries. `max_tries` must be at least 2; lower values fail
/// with [`FetchError::InvalidMaxTries`] before any request is made.
///
/// An attempt is retried when the transport reports an error (connectivity,
/// DNS, timeout) or when the response status falls outside 200-299. Once the
/// budget is exhausted the error of the final attempt is returned unchanged,
/// not an earlier one.
///
/// `cancel` preempts both the backoff pause and the in-flight request; a
/// cancelled fetch returns [`FetchError::Cancelled`] immediately and makes no
/// further attempts. Pass a fresh [`CancellationToken`] to fetch without a
/// cancellation bound.
#[tracing::instrument(skip(transport, cancel))]
pub async fn get_string_with_retries<T>(
    transport: &T,
    url: &str,
    max_tries: usize,
    cancel: &CancellationToken,
) -> Result<String>
where
    T: HttpTransport + ?Sized,
{
    if max_tries < 2 {
        return Err(FetchError::InvalidMaxTries(max_tries).into());
    }

    let total = max_tries + 1;
    let mut last_error = None;

    for attempt in 0..=max_tries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            debug!("Waiting {:?} before attempt {}/{}...", delay, attempt + 1, total);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled.into()),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let error = match transport.get(url, cancel).await {
            Ok(response) if response.status.is_success() => {
                debug!("GET {}: attempt {}/{} succeeded", url, attempt + 1, total);
                return Ok(response.body);
            }
            Ok(response) => anyhow::Error::from(FetchError::Status(response.status)),
            Err(error) => {
                if matches!(
                    error.downcast_ref::<FetchError>(),
                    Some(FetchError::Cancelled)
                ) {
                    return Err(error);
                }
                error
            }
        };

        if attempt < max_tries {
            warn!(
                "GET {}: attempt {}/{} failed ({}), retrying...",
                url,
                attempt + 1,
                total,
                error
            );
        }
        last_error = Some(error);
    }

    Err(last_error.unwrap_or_else(|| FetchError::NoOutcome.into()))
}
