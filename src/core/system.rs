//! Target platform identifiers.
//!
//! A [`System`] is an `os/arch` pair such as `linux/amd64` or `darwin/arm64`. Dependency
//! declarations are written against Go-style platform names, so [`System::current`] maps the
//! host's Rust names onto those.

use crate::core::error::BindepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An `os/arch` pair.
///
/// Ordering and equality are those of the underlying string, so systems sort the way they
/// are written in config files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct System(String);

impl System {
    /// Parses and validates an `os/arch` string.
    ///
    /// # Errors
    ///
    /// Returns [`BindepError::InvalidSystem`] unless the value contains exactly one `/` with
    /// non-empty text on both sides.
    pub fn new(value: &str) -> Result<Self, BindepError> {
        let mut parts = value.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(os), Some(arch), None) if !os.is_empty() && !arch.is_empty() => {
                Ok(Self(value.to_string()))
            }
            _ => Err(BindepError::InvalidSystem {
                value: value.to_string(),
            }),
        }
    }

    /// Builds a system from its two halves.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self, BindepError> {
        Self::new(&format!("{os}/{arch}"))
    }

    /// The system bindep is running on.
    #[must_use]
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        Self(format!("{os}/{arch}"))
    }

    /// The operating system half.
    #[must_use]
    pub fn os(&self) -> &str {
        self.0.split_once('/').map_or("", |(os, _)| os)
    }

    /// The architecture half.
    #[must_use]
    pub fn arch(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, arch)| arch)
    }

    /// The `os/arch` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for System {
    type Err = BindepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for System {
    type Error = BindepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<System> for String {
    fn from(system: System) -> Self {
        system.0
    }
}
