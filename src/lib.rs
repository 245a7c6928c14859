//! bindep - reproducible binary dependency downloads
//!
//! A config file (`bindep.yaml`) declares the binaries a project needs: where to download
//! them for each platform, where the binary sits inside the archive, and the SHA-256 of every
//! URL. bindep resolves a dependency for a system, downloads it into a content-addressed
//! cache, extracts it, and installs the binary.
//!
//! # Modules
//!
//! - [`config`] - the config file and the operations built on it (install, validate,
//!   checksum maintenance, template imports)
//! - [`resolver`] - turns a [`models::Dependency`] into a [`models::BuiltDependency`] for one
//!   system: templates, overrides, and `{{ var }}` interpolation
//! - [`fetch`] - the download, extract and install pipeline
//! - [`cache`] - the lock-protected, content-addressed entry store the pipeline writes into
//! - [`core`] - errors and the [`core::System`] type
//! - [`cli`] - the `bindep` command
//!
//! # Config Example
//!
//! ```yaml
//! systems: [linux/amd64, darwin/arm64]
//! dependencies:
//!   jq:
//!     url: https://example.com/jq-{{ os }}-{{ arch }}.tar.gz
//!     archive_path: jq
//! url_checksums:
//!   https://example.com/jq-linux-amd64.tar.gz: 5f2a...
//!   https://example.com/jq-darwin-arm64.tar.gz: 9c41...
//! ```
//!
//! # Cache Layout
//!
//! ```text
//! .bindep/
//! ├── downloads/<key>/<file>     # verified against url_checksums
//! └── extracts/<key>/...         # verified against .extract_sums/<key>.sum
//! ```
//!
//! Every entry is sealed read-only once populated. Concurrent processes coordinate through
//! file locks under each cache's `.locks` directory.

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetch;
pub mod models;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
