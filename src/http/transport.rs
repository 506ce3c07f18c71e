//! Transport seam for performing a single HTTP GET.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

use super::retry::FetchError;

/// Status and full body of a completed GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Capability of performing a GET request. Injected into the retry loop,
/// enabling dependency injection and testability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs a GET request against `url` and returns the response status
    /// and full body. Must abort promptly if `cancel` fires while the request
    /// is in flight, returning [`FetchError::Cancelled`].
    ///
    /// A non-2xx status is not an error at this level; classification is the
    /// caller's concern.
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<HttpResponse>;
}

/// Production transport backed by a reqwest Client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<HttpResponse> {
        let request = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .context("Failed to send request")?;

            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;

            Ok(HttpResponse { status, body })
        };

        // Dropping the request future aborts the in-flight call. An already
        // cancelled token wins over a ready response.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled.into()),
            result = request => result,
        }
    }
}
