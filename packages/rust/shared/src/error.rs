//! Error types for docsprompt.
//!
//! Library crates use [`DocsPromptError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docsprompt operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsPromptError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// Content store (de)serialization error.
    #[error("store error: {0}")]
    Store(String),

    /// Language-model completion error (transport, API status, or response shape).
    #[error("llm error: {0}")]
    Llm(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad URL, unsupported scheme, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsPromptError>;

impl DocsPromptError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocsPromptError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = DocsPromptError::validation("unsupported scheme 'ftp'");
        assert!(err.to_string().contains("unsupported scheme"));

        let err = DocsPromptError::Llm("HTTP 401".into());
        assert_eq!(err.to_string(), "llm error: HTTP 401");
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DocsPromptError::io("/tmp/store.json", source);
        assert!(err.to_string().contains("/tmp/store.json"));
    }
}
