//! Error types for manubuild.
//!
//! Library crates use [`ManubuildError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all manubuild operations.
#[derive(Debug, thiserror::Error)]
pub enum ManubuildError {
    /// A required input file (usually the master document) is absent.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Manuscript structure could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (duplicate chapter numbers, bad identifiers, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Image or PDF backend failure.
    #[error("render error: {0}")]
    Render(String),

    /// Slide-deck packaging failure.
    #[error("package error: {0}")]
    Package(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ManubuildError>;

impl ManubuildError {
    /// Create a not-found error for a path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means a required input was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ManubuildError::config("bad slug");
        assert_eq!(err.to_string(), "config error: bad slug");

        let err = ManubuildError::validation("duplicate chapter number 3 in VOL1");
        assert!(err.to_string().contains("chapter number 3"));
    }

    #[test]
    fn not_found_names_the_path() {
        let err = ManubuildError::not_found("/tmp/project/MASTER.md");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("MASTER.md"));
    }
}
