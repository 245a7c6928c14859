//! Fetching URLs.
//!
//! The pipeline only sees the [`Fetcher`] trait, so tests can substitute an in-memory or
//! counting implementation. [`HttpFetcher`] serves `http(s)://` URLs with a blocking `reqwest`
//! client and `file://` URLs from the local filesystem.

use crate::core::BindepError;
use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// The response to a [`Fetcher::get`] request.
pub struct FetchResponse {
    /// HTTP status code (`200` for local files found, `404` for missing ones)
    pub status: u16,
    /// The response body
    pub body: Box<dyn Read + Send>,
}

impl FetchResponse {
    /// Returns the body, or [`BindepError::DownloadFailed`] for a status of 300 or more.
    pub fn into_body(self, url: &str) -> Result<Box<dyn Read + Send>, BindepError> {
        if self.status >= 300 {
            return Err(BindepError::DownloadFailed {
                url: url.to_string(),
                status: self.status,
            });
        }
        Ok(self.body)
    }
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse").field("status", &self.status).finish_non_exhaustive()
    }
}

/// Retrieves the content behind a URL.
///
/// Implementations block the calling thread and apply no timeout of their own.
pub trait Fetcher: Send + Sync {
    /// Starts a GET request for `url`.
    ///
    /// Transport failures are errors; HTTP error statuses are returned as a response.
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// The default [`Fetcher`]: `reqwest` for http(s), the filesystem for `file://`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    _private: (),
}

impl HttpFetcher {
    /// Creates a fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    fn get_file(path: &Path) -> Result<FetchResponse> {
        match File::open(path) {
            Ok(file) => Ok(FetchResponse {
                status: 200,
                body: Box::new(file),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: Box::new(io::empty()),
            }),
            Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        if let Some(path) = url.strip_prefix("file://") {
            debug!(url, "Reading local file");
            return Self::get_file(Path::new(path));
        }

        debug!(url, "Sending GET request");
        // The blocking client has a 30s default timeout; downloads may legitimately take longer
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .user_agent(concat!("bindep/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let response =
            client.get(url).send().with_context(|| format!("Failed to request {url}"))?;
        let status = response.status().as_u16();
        debug!(url, status, "Received response");

        Ok(FetchResponse {
            status,
            body: Box::new(response),
        })
    }
}
