//! Integration test suite for bindep
//!
//! End-to-end tests of the `bindep` binary and of the library's download pipeline against
//! real files. Archives are served from `file://` URLs, so no test touches the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cache_behavior**: Cache reuse, repair and concurrent installs
//! - **checksums**: `checksums add` / `checksums prune`
//! - **dependency**: `dependency` inspection commands
//! - **error_scenarios**: Exit codes and error messages
//! - **install**: Install workflows
//! - **templates**: Template sources and `template copy`
//! - **validate**: Validation command

mod common;

mod cache_behavior;
mod checksums;
mod dependency;
mod error_scenarios;
mod install;
mod templates;
mod validate;
