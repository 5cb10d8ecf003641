//! Blocklist retrieval.
//!
//! Provides a trait-based abstraction over HTTP so the update pipeline can be
//! tested without network access. The production implementation issues
//! conditional GET requests with `If-None-Match` once an `ETag` is known.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};

/// User-Agent header value for HTTP requests.
pub const USER_AGENT: &str = concat!("hostsync/", env!("CARGO_PKG_VERSION"));

/// Error type for blocklist retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a status other than 200 or 304.
    #[error("HTTP request failed for {url}: status {status}")]
    HttpStatus {
        /// URL that was requested.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// Network error during HTTP request.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Timeout fetching the remote URL.
    #[error("timeout fetching {url}")]
    Timeout {
        /// URL that timed out.
        url: String,
    },

    /// Failed to create HTTP client.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// What the network collaborator hands to the update pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// The server confirmed the cached copy is current (304).
    pub not_modified: bool,
    /// `ETag` of the response, if the server sent a non-empty one.
    pub etag: Option<String>,
    /// Response body. Absent for 304 responses.
    pub body: Option<Bytes>,
}

impl FetchResponse {
    /// A 200 response carrying a body.
    pub fn ok(body: impl Into<Bytes>, etag: Option<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            not_modified: false,
            etag: etag.filter(|tag| !tag.is_empty()),
            body: Some(body.into()),
        }
    }

    /// A 304 response.
    #[must_use]
    pub fn not_modified(etag: Option<String>) -> Self {
        Self {
            status: StatusCode::NOT_MODIFIED.as_u16(),
            not_modified: true,
            etag: etag.filter(|tag| !tag.is_empty()),
            body: None,
        }
    }
}

/// Trait for blocklist retrieval.
///
/// Implementations must bound every request by a timeout and must not retain
/// state between calls: revalidation tokens are owned by the caller.
pub trait SourceFetcher: Send + Sync {
    /// Fetch a URL, sending `etag` as a revalidation token when present.
    fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// HTTP fetcher built on reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client })
    }

    fn map_error(url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, etag: Option<&str>) -> Result<FetchResponse, FetchError> {
        let mut request = self.client.get(url);
        if let Some(etag) = etag {
            tracing::debug!(url = %url, etag = %etag, "sending conditional request");
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|err| Self::map_error(url, err))?;

        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            content_length = ?response.content_length(),
            etag = ?etag,
            "received response"
        );

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchResponse::not_modified(etag));
        }

        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Self::map_error(url, err))?;

        Ok(FetchResponse::ok(body, etag))
    }
}
