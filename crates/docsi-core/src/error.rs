//! Error types and handling for docsi-core operations.
//!
//! A single [`Error`] enum covers every failure the library can report.
//! Errors are grouped into categories (see [`Error::category`]) so callers
//! can log or count them uniformly, and [`Error::is_recoverable`] tells
//! retry logic whether trying again could help.
//!
//! ```rust
//! use docsi_core::{Error, Result};
//!
//! fn describe(result: Result<()>) -> String {
//!     match result {
//!         Ok(()) => "ok".to_string(),
//!         Err(e) if e.is_recoverable() => format!("retry later: {e}"),
//!         Err(e) => format!("{} failure: {e}", e.category()),
//!     }
//! }
//!
//! assert_eq!(describe(Ok(())), "ok");
//! ```

use thiserror::Error;

/// The main error type for docsi-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Timeouts and interruptions are treated as recoverable; everything
    /// else (missing files, permissions) is permanent.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed while fetching a search index.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The input could not be read as a search index at all.
    ///
    /// Raised for a missing `var <ident> =` assignment, malformed JSON, or
    /// a top-level value that is neither a `{"docs": [...]}` object nor an
    /// array.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A single fragment record was malformed.
    ///
    /// Only produced in strict parsing mode; lenient mode turns the same
    /// problem into a diagnostic and skips the record.
    #[error("Invalid record #{index}: {reason}")]
    InvalidRecord {
        /// Zero-based position of the record in the `docs` array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Search index operation failed.
    #[error("Index error: {0}")]
    Index(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Alias is not usable as a source name.
    #[error("Invalid alias '{alias}': {reason}")]
    InvalidAlias {
        /// The rejected alias.
        alias: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Serialization or deserialization of persisted data failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// ```rust
    /// use docsi_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")).is_recoverable());
    /// assert!(!Error::Parse("not a search index".into()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            },
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful as a structured logging field:
    ///
    /// ```rust
    /// use docsi_core::Error;
    ///
    /// let err = Error::InvalidRecord { index: 3, reason: "missing field `page`".into() };
    /// tracing::warn!(category = err.category(), "{err}");
    /// assert_eq!(err.category(), "parse");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) | Self::InvalidRecord { .. } => "parse",
            Self::Index(_) => "index",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidAlias { .. } => "invalid_alias",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let cases = vec![
            (Error::Parse("bad json".into()), "Parse error: bad json"),
            (
                Error::InvalidRecord {
                    index: 4,
                    reason: "unknown category `module`".into(),
                },
                "Invalid record #4: unknown category `module`",
            ),
            (Error::Index("locked".into()), "Index error: locked"),
            (Error::NotFound("source 'x'".into()), "Not found: source 'x'"),
            (
                Error::InvalidAlias {
                    alias: "../etc".into(),
                    reason: "contains path traversal characters".into(),
                },
                "Invalid alias '../etc': contains path traversal characters",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "missing");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert_eq!(error.category(), "io");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Serialization(_)));
    }

    #[test]
    fn test_recoverable_io_kinds() {
        let timed_out = Error::Io(io::Error::new(io::ErrorKind::TimedOut, "t"));
        let interrupted = Error::Io(io::Error::new(io::ErrorKind::Interrupted, "i"));
        let denied = Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "p"));

        assert!(timed_out.is_recoverable());
        assert!(interrupted.is_recoverable());
        assert!(!denied.is_recoverable());
    }

    #[test]
    fn test_categories_are_stable() {
        assert_eq!(Error::Parse(String::new()).category(), "parse");
        assert_eq!(Error::Storage(String::new()).category(), "storage");
        assert_eq!(Error::Config(String::new()).category(), "config");
        assert_eq!(Error::Serialization(String::new()).category(), "serialization");
    }

    proptest! {
        #[test]
        fn test_parse_errors_never_recoverable(msg in ".*") {
            let error = Error::Parse(msg.clone());
            prop_assert!(!error.is_recoverable());
            prop_assert!(error.to_string().contains(&msg));
        }

        #[test]
        fn test_invalid_record_keeps_index(index in 0usize..100_000) {
            let error = Error::InvalidRecord { index, reason: "x".into() };
            let expected = format!("#{index}:");
            prop_assert!(error.to_string().contains(&expected));
        }
    }
}
