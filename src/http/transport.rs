//! The HTTP seam between the dispatcher and the network.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// What came back from one POST.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` to `url` with exactly the given headers.
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
        timeout: Duration,
    ) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a pooled reqwest client, so connections are kept alive
/// between calls.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps an existing reqwest client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client that transparently decodes compressed responses.
    pub fn build() -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, headers, body))]
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
        timeout: Duration,
    ) -> Result<TransportResponse> {
        debug!("POST {} ({} bytes)...", url, body.len());

        let response = self
            .client
            .post(url)
            .headers(headers)
            .timeout(timeout)
            .body(body.into_bytes())
            .send()
            .await
            .context("Failed to send SOAP request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .context("Failed to read SOAP response body")?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
