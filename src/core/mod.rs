//! Core types shared by every bindep module.
//!
//! - [`error`] - the [`BindepError`] taxonomy and user-facing [`ErrorContext`]
//! - [`system`] - the [`System`] (`os/arch`) target identifier
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use bindep::core::{BindepError, System};
//!
//! match "linux".parse::<System>() {
//!     Ok(system) => println!("target {system}"),
//!     Err(BindepError::InvalidSystem { value }) => eprintln!("bad system {value}"),
//!     Err(other) => eprintln!("{other}"),
//! }
//! ```

pub mod error;
pub mod system;

pub use error::{BindepError, ErrorContext, user_friendly_error};
pub use system::System;
