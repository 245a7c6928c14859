//! Error handling for bindep
//!
//! This module provides the typed error taxonomy of bindep and the user-facing error
//! reporting used by the CLI. The design follows two principles:
//! 1. **Strongly-typed errors** ([`BindepError`]) so library callers can match on failures
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! Library operations return [`anyhow::Result`] and wrap a [`BindepError`] where the failure
//! has a meaningful type. Callers recover the typed error with
//! [`anyhow::Error::downcast_ref`]:
//!
//! ```rust,no_run
//! use bindep::core::BindepError;
//!
//! fn is_missing_checksum(err: &anyhow::Error) -> bool {
//!     matches!(err.downcast_ref::<BindepError>(), Some(BindepError::MissingChecksum { .. }))
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bindep operations.
///
/// # Error Categories
///
/// - **Resolution**: [`UnknownDependency`], [`UnknownTemplate`], [`NoUrl`],
///   [`TemplateError`], [`InvalidSystem`], [`UnsupportedSystem`], [`MissingRequiredVars`]
/// - **Integrity**: [`MissingChecksum`], [`ChecksumMismatch`]
/// - **Cache**: [`InvalidCacheKey`], [`CacheEntryInvalid`], [`NotADirectory`]
/// - **Archives**: [`InvalidArchive`]
/// - **Transport**: [`DownloadFailed`]
/// - **Configuration**: [`ConfigError`]
///
/// [`UnknownDependency`]: BindepError::UnknownDependency
/// [`UnknownTemplate`]: BindepError::UnknownTemplate
/// [`NoUrl`]: BindepError::NoUrl
/// [`TemplateError`]: BindepError::TemplateError
/// [`InvalidSystem`]: BindepError::InvalidSystem
/// [`UnsupportedSystem`]: BindepError::UnsupportedSystem
/// [`MissingRequiredVars`]: BindepError::MissingRequiredVars
/// [`MissingChecksum`]: BindepError::MissingChecksum
/// [`ChecksumMismatch`]: BindepError::ChecksumMismatch
/// [`InvalidCacheKey`]: BindepError::InvalidCacheKey
/// [`CacheEntryInvalid`]: BindepError::CacheEntryInvalid
/// [`InvalidArchive`]: BindepError::InvalidArchive
/// [`NotADirectory`]: BindepError::NotADirectory
/// [`DownloadFailed`]: BindepError::DownloadFailed
/// [`ConfigError`]: BindepError::ConfigError
#[derive(Error, Debug)]
pub enum BindepError {
    /// A dependency name that is not declared in the config
    #[error("no dependency configured with the name '{name}'")]
    UnknownDependency {
        /// The requested dependency name
        name: String,
    },

    /// A dependency or template references a template that does not exist
    #[error("no template named '{name}'")]
    UnknownTemplate {
        /// The referenced template name (possibly `source#name`)
        name: String,
    },

    /// Resolution finished without a URL
    #[error("no URL configured for dependency '{name}'")]
    NoUrl {
        /// The dependency being resolved
        name: String,
    },

    /// Interpolating a field failed (undefined variable or malformed template)
    #[error("failed to interpolate {field} for dependency '{name}': {reason}")]
    TemplateError {
        /// The dependency being resolved
        name: String,
        /// The field being interpolated (`url`, `archive_path` or `bin`)
        field: String,
        /// The template engine's message
        reason: String,
    },

    /// A system string is not of the form `os/arch`
    #[error("invalid system '{value}': expected the form os/arch")]
    InvalidSystem {
        /// The rejected value
        value: String,
    },

    /// The dependency does not support the requested system
    #[error("dependency '{name}' does not support system '{system}'")]
    UnsupportedSystem {
        /// The dependency name
        name: String,
        /// The requested system
        system: String,
    },

    /// Variables declared as required are not set after resolution
    #[error("dependency '{name}' is missing required vars: {vars}")]
    MissingRequiredVars {
        /// The dependency name
        name: String,
        /// Comma separated list of the missing variables
        vars: String,
    },

    /// No checksum is configured for the resolved URL
    #[error("no checksum configured for '{name}'")]
    MissingChecksum {
        /// The dependency name
        name: String,
    },

    /// Content did not hash to the expected value
    #[error("checksum mismatch in {subject}: wanted {wanted} got {got}")]
    ChecksumMismatch {
        /// What was verified (a downloaded file or an extracted directory)
        subject: String,
        /// The expected checksum
        wanted: String,
        /// The computed checksum
        got: String,
    },

    /// A cache key is not a single path segment or starts with `.`
    #[error("invalid cache key '{key}'")]
    InvalidCacheKey {
        /// The rejected key
        key: String,
    },

    /// A cache entry failed validation and could not be repopulated
    #[error("cache entry '{key}' is invalid: {reason}")]
    CacheEntryInvalid {
        /// The cache key
        key: String,
        /// Why the entry is invalid
        reason: String,
    },

    /// A cache path exists but is not a directory
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path
        path: String,
    },

    /// A downloaded file cannot be unpacked
    #[error("cannot unpack {path}: {reason}")]
    InvalidArchive {
        /// The archive file
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// An HTTP request returned a non-success status
    #[error("failed downloading {url}: status {status}")]
    DownloadFailed {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The config file is missing or malformed
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for BindepError {
    fn clone(&self) -> Self {
        match self {
            Self::UnknownDependency {
                name,
            } => Self::UnknownDependency {
                name: name.clone(),
            },
            Self::UnknownTemplate {
                name,
            } => Self::UnknownTemplate {
                name: name.clone(),
            },
            Self::NoUrl {
                name,
            } => Self::NoUrl {
                name: name.clone(),
            },
            Self::TemplateError {
                name,
                field,
                reason,
            } => Self::TemplateError {
                name: name.clone(),
                field: field.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSystem {
                value,
            } => Self::InvalidSystem {
                value: value.clone(),
            },
            Self::UnsupportedSystem {
                name,
                system,
            } => Self::UnsupportedSystem {
                name: name.clone(),
                system: system.clone(),
            },
            Self::MissingRequiredVars {
                name,
                vars,
            } => Self::MissingRequiredVars {
                name: name.clone(),
                vars: vars.clone(),
            },
            Self::MissingChecksum {
                name,
            } => Self::MissingChecksum {
                name: name.clone(),
            },
            Self::ChecksumMismatch {
                subject,
                wanted,
                got,
            } => Self::ChecksumMismatch {
                subject: subject.clone(),
                wanted: wanted.clone(),
                got: got.clone(),
            },
            Self::InvalidCacheKey {
                key,
            } => Self::InvalidCacheKey {
                key: key.clone(),
            },
            Self::CacheEntryInvalid {
                key,
                reason,
            } => Self::CacheEntryInvalid {
                key: key.clone(),
                reason: reason.clone(),
            },
            Self::NotADirectory {
                path,
            } => Self::NotADirectory {
                path: path.clone(),
            },
            Self::InvalidArchive {
                path,
                reason,
            } => Self::InvalidArchive {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DownloadFailed {
                url,
                status,
            } => Self::DownloadFailed {
                url: url.clone(),
                status: *status,
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone, keep its message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Wraps a [`BindepError`] with an optional suggestion and details. The CLI renders it with
/// [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BindepError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: BindepError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] suitable for display.
///
/// Typed [`BindepError`]s anywhere in the chain get tailored suggestions; everything else is
/// rendered with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(bindep_error) = error.chain().find_map(|e| e.downcast_ref::<BindepError>()) {
        let mut ctx = create_error_context(bindep_error.clone());
        // Keep the outer context (paths, keys) visible above the typed error
        let outer = error.to_string();
        if outer != bindep_error.to_string() && ctx.details.is_none() {
            ctx.details = Some(outer);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(BindepError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check the permissions of the cache and install directories");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BindepError::Other {
        message,
    })
}

/// Attaches a "did you mean" hint when `name` is close to one of `candidates`.
///
/// Used by the CLI for unknown dependency and template names.
pub fn with_similar_names<'a>(
    ctx: ErrorContext,
    name: &str,
    candidates: impl IntoIterator<Item = &'a String>,
) -> ErrorContext {
    let mut scored: Vec<(usize, &String)> = candidates
        .into_iter()
        .map(|c| (strsim::levenshtein(name, c), c))
        .filter(|(d, _)| *d <= 3)
        .collect();
    scored.sort();

    match scored.first() {
        Some((_, best)) => ctx.with_suggestion(format!("did you mean '{best}'?")),
        None => ctx,
    }
}

fn create_error_context(error: BindepError) -> ErrorContext {
    match &error {
        BindepError::UnknownDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'bindep dependency list' to see the configured dependencies"),

        BindepError::UnknownTemplate {
            name,
        } => {
            let suggestion = if name.contains('#') {
                "Copy the template into the config with 'bindep template copy <source> <template>'"
            } else {
                "Add the template to the 'templates' section of the config"
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        BindepError::NoUrl {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Set 'url' on the dependency, its template, or a matching override"),

        BindepError::TemplateError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Variables are referenced as {{ name }}; define every referenced variable in 'vars'")
            .with_details("Undefined variables are an error so that a partially rendered URL is never downloaded"),

        BindepError::MissingChecksum {
            name,
        } => {
            let suggestion = format!(
                "Run 'bindep checksums add {name}' or pass --allow-missing-checksum"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        BindepError::ChecksumMismatch {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Verify the configured checksum, then retry with --force")
            .with_details("The corrupt file was removed from the cache"),

        BindepError::UnsupportedSystem {
            name,
            ..
        } => {
            let suggestion = format!("Run 'bindep dependency systems {name}' to list its systems");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        BindepError::DownloadFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the dependency URL and your network connection"),

        BindepError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass --configfile or create bindep.yaml in the current directory"),

        _ => ErrorContext::new(error),
    }
}
