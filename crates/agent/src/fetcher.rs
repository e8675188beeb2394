//! HTTP client for the remote `_stats` endpoint.
//!
//! [`StatsSource`] is the seam the poll loop depends on; production uses
//! [`HttpStatsFetcher`], tests plug in scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

/// Errors from a single fetch attempt.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The endpoint answered with anything other than `200 OK`.
    #[error("Unexpected status from stats endpoint: {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The status was fine but the body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Something that can produce one raw stats body per call.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch the raw payload. No retries; the poll loop owns retry policy.
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the stats payload with a plain `GET`.
pub struct HttpStatsFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpStatsFetcher {
    /// Create a fetcher with its own client and the given request timeout.
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl StatsSource for HttpStatsFetcher {
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        // Exactly 200: a 204 or 206 carries no usable payload.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(FetchError::Body)
    }
}
