//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: setup errors (config, HTTP client, stdin), with context
//! - Per-request stage errors live in `recognition::domain` and never reach
//!   this type: the pipeline reduces them to a coarse
//!   [`FailureKind`](crate::recognition::FailureKind).
//!
//! # Example
//!
//! ```ignore
//! use tunelink::error::{Error, Result};
//!
//! fn build(config: &Config) -> Result<Pipeline> {
//!     let client = CrossReferenceClient::new().with_context("Building HTTP client")?;
//!     Ok(...)
//! }
//! ```

use crate::config::ConfigError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client setup or transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, reqwest::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Http(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_error_display() {
        let err: Error = ConfigError::Read(
            PathBuf::from("/etc/tunelink.toml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        )
        .into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("/etc/tunelink.toml"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.with_context("Reading stdin").unwrap_err();
        assert!(err.to_string().starts_with("Reading stdin"));
        assert!(matches!(err, Error::WithContext { .. }));
    }

    #[test]
    fn test_result_ext_keeps_source() {
        let result: Result<()> = Err(Error::Io(std::io::Error::other("broken pipe")));
        let err = result.with_context("additional context").unwrap_err();
        assert!(err.to_string().contains("additional context"));
        assert!(err.to_string().contains("broken pipe"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("broken pipe"));
    }
}
