//! HTTP fetcher implementation
//!
//! This module performs the single GET request of a rip and hands back the
//! response body as a stream of chunks. It never retries, and it treats
//! every HTTP status as a body worth reading: a 404 page's own links are
//! reported like any other page's.

use crate::config::FetcherConfig;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Response body as it arrives from the network
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Why a fetch produced no body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use link_ripper::config::FetcherConfig;
/// use link_ripper::ripper::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs the GET request of a rip
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `target` and returns its body as a stream
    ///
    /// The client's overall timeout covers the body as well as the request,
    /// so a stalled server ends the stream with a read error instead of
    /// hanging the rip.
    ///
    /// # Returns
    ///
    /// * `Ok(ByteStream)` - The response body, whatever the status code
    /// * `Err(FetchError)` - No response was received
    pub async fn fetch(&self, target: &Url) -> Result<ByteStream, FetchError> {
        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| classify_error(target, e))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("GET {} -> {}", target, status);
        } else {
            tracing::debug!("GET {} -> {}, extracting links from error body", target, status);
        }

        Ok(body_stream(response))
    }
}

/// Turns a response into a chunk stream that ends after the first error
fn body_stream(response: Response) -> ByteStream {
    stream::unfold(Some(response), |state| async move {
        let mut response = state?;
        match response.chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(response))),
            Ok(None) => None,
            Err(e) => Some((Err(FetchError::Body(e.to_string())), None)),
        }
    })
    .boxed()
}

fn classify_error(target: &Url, error: reqwest::Error) -> FetchError {
    let url = target.to_string();

    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Request { url, source: error }
    }
}
