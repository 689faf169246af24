//! HTTP request execution
//!
//! One call to [`RequestExecutor::fetch`] is one GET: the response body is
//! streamed to the end and only its length is kept.


use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Performs a single bounded GET. Implemented by [`HttpFetcher`] and by test doubles.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// GET `url` and return the body length in bytes.
    ///
    /// Must return `AppError::Cancelled` once `cancel` fires, aborting any
    /// network work still in progress.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<u64>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for std::sync::Arc<T> {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<u64> {
        (**self).fetch(url, cancel).await
    }
}

/// Builder options for the underlying reqwest client
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub user_agent: String,
    pub max_redirects: usize,
    pub connect_timeout: Option<Duration>,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", crate::PKG_NAME, crate::VERSION),
            max_redirects: 10,
            connect_timeout: None,
        }
    }
}

/// reqwest-backed request executor
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default options
    pub fn new() -> Result<Self> {
        Self::with_options(FetcherOptions::default())
    }

    /// Create a fetcher with custom client options
    pub fn with_options(options: FetcherOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(options.user_agent)
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects));

        if let Some(connect_timeout) = options.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send the request and count body bytes chunk by chunk
    async fn download(&self, url: &str) -> Result<u64> {
        let url = Url::parse(url)?;
        let mut response = self.client.get(url).send().await?;

        let mut total: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            total += chunk.len() as u64;
        }

        Ok(total)
    }
}

#[async_trait]
impl RequestExecutor for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(AppError::cancelled("request cancelled before it started"));
        }

        // Dropping the download future closes the connection
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::cancelled("request aborted")),
            result = self.download(url) => result,
        }
    }
}

/// Utility functions for HTTP operations
pub struct HttpUtils;

impl HttpUtils {
    /// Validate URL format: http or https with a host
    pub fn validate_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::validation(format!("Invalid URL format: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => {},
            scheme => return Err(AppError::validation(format!("Unsupported URL scheme: {}", scheme))),
        }

        if parsed.host().is_none() {
            return Err(AppError::validation("URL must have a host"));
        }

        Ok(())
    }
}
