//! HTTP blob source for images referenced by URL.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use url::Url;

use trip_insight_core::{traits::BlobSource, Error, Result};

/// Downloads images from http(s) URLs with a fixed per-request timeout.
pub struct HttpBlobSource {
    client: reqwest::Client,
}

impl HttpBlobSource {
    /// Create a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn parse(raw: &str) -> Result<Url> {
        let url = Url::parse(raw).map_err(|e| Error::storage(format!("invalid URL: {}", e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::storage(format!("unsupported URL scheme: {}", other))),
        }
    }
}

#[async_trait]
impl BlobSource for HttpBlobSource {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        let url = Self::parse(key)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::storage(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::storage(format!("HTTP {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::storage(format!("body read error: {}", e)))
    }
}
