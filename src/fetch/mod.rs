//! Download, extract and install pipeline
//!
//! Each stage works on a [`BuiltDependency`](crate::models::BuiltDependency) and a cache:
//!
//! 1. [`download`] fetches the URL into the downloads cache and verifies its checksum
//! 2. [`extract`] unpacks the download into the extracts cache under the same key
//! 3. [`install`] copies or links the binary out of the extracted entry
//!
//! The stages hand each other [`CacheGuard`](crate::cache::CacheGuard)s, so the entries in use
//! cannot be evicted until installation finishes.

pub mod archive;
pub mod download;
pub mod extract;
pub mod http;
pub mod install;

pub use download::{DownloadOptions, Downloaded, download, fetch_to};
pub use extract::{ExtractOptions, Extracted, extract};
pub use http::{FetchResponse, Fetcher, HttpFetcher};
pub use install::install;
