//! An in-memory fetcher for tests.

use crate::fetch::{FetchResponse, Fetcher};
use anyhow::Result;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves fixed bodies by URL and counts every request.
///
/// Unknown URLs get a `404` response.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
}

impl CountingFetcher {
    /// A fetcher with no URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// Number of requests made so far, including failed ones.
    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Fetcher for CountingFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(match self.bodies.get(url) {
            Some(body) => FetchResponse {
                status: 200,
                body: Box::new(Cursor::new(body.clone())),
            },
            None => FetchResponse {
                status: 404,
                body: Box::new(io::empty()),
            },
        })
    }
}
