//! Test utilities for bindep
//!
//! Available to unit tests and, through the `test-utils` feature, to the integration tests:
//!
//! - [`init_test_logging`] - installs a test-writer `tracing` subscriber once
//! - [`fixtures`] - gzip tarballs and config files built in memory
//! - [`CountingFetcher`] - an in-memory [`Fetcher`](crate::fetch::Fetcher) that counts requests
//!
//! # Example
//!
//! ```rust,ignore
//! use bindep::test_utils::{CountingFetcher, tarball};
//!
//! let archive = tarball(&[("bin/foo", "#!/bin/sh\necho foo\n")]);
//! let fetcher = CountingFetcher::new().with_body("https://example.com/foo.tar.gz", archive);
//! assert_eq!(fetcher.count(), 0);
//! ```

pub mod fetcher;
pub mod fixtures;

pub use fetcher::CountingFetcher;
pub use fixtures::{ConfigFixture, sha256_hex, tarball};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a subscriber writing through the test harness, once per process. Uses `level` when
/// given, else `RUST_LOG`; with neither, no subscriber is installed.
///
/// ```bash
/// RUST_LOG=bindep=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}
