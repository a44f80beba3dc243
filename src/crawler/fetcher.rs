//! Page fetching
//!
//! This module defines the [`PageFetcher`] seam the crawler pulls raw pages
//! through, plus the reqwest-backed [`HttpFetcher`] used by default (the
//! browser renderer lives in `browser.rs`):
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for page source
//! - Error classification (status, timeout, network)

use crate::config::{CrawlerConfig, RenderStrategy};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Reasons a page could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Render strategy {strategy:?} is not supported by this fetcher")]
    UnsupportedStrategy { strategy: RenderStrategy },
}

/// Source of raw page content
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieves the page at `url` using the given strategy
    ///
    /// Any failure (network error, non-success status, timeout) is returned
    /// as a [`FetchError`]; implementations do not retry.
    async fn fetch(&self, url: &str, strategy: RenderStrategy) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and fetch timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Lightweight fetcher issuing a single GET per page
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, strategy: RenderStrategy) -> Result<String, FetchError> {
        match strategy {
            RenderStrategy::Http => fetch_url(&self.client, url).await,
            RenderStrategy::Browser => Err(FetchError::UnsupportedStrategy { strategy }),
        }
    }
}

/// Fetches a URL and returns its body
///
/// Only `200 OK` counts as success; every other status is reported as
/// [`FetchError::Status`]. Redirects are followed by the client.
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
