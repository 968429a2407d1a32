//! Error types for pagemark operations.
//!
//! This module defines the main error type [`PagemarkError`] which represents
//! all possible errors that can occur while fetching a page and converting it
//! to Markdown.
//!
//! # Example
//!
//! ```rust
//! use pagemark_core::{PagemarkError, Result};
//!
//! fn check_input(html: &str) -> Result<()> {
//!     if html.is_empty() {
//!         return Err(PagemarkError::EmptyInput);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations.
///
/// Pipeline errors are terminal for a single request: no component retries
/// internally, and no error is silently swallowed. The extraction fallback
/// (no sufficiently-scored candidate) is deliberately *not* an error; it is
/// surfaced as the `used_fallback` flag on [`Conversion`](crate::Conversion).
#[derive(Error, Debug)]
pub enum PagemarkError {
    /// The input HTML string was empty.
    ///
    /// Fatal to the request; the pipeline has nothing to convert.
    #[error("Input HTML is empty")]
    EmptyInput,

    /// The input bytes could not be decoded as UTF-8 text.
    ///
    /// Malformed *markup* is always tolerated and repaired; this error only
    /// occurs when the bytes are not text at all.
    #[error("Input bytes are not valid UTF-8 text")]
    DecodeError,

    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// HTTP-related problems from the fetch collaborator.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or lacks an http(s) scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    ///
    /// Returned when attempting to read a local HTML file that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File I/O errors.
    ///
    /// Wraps standard I/O errors for file and stdin operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for PagemarkError.
///
/// This is a convenience alias for `std::result::Result<T, PagemarkError>`.
pub type Result<T> = std::result::Result<T, PagemarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_display() {
        let err = PagemarkError::EmptyInput;
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = PagemarkError::DecodeError;
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_invalid_url_display() {
        let err = PagemarkError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_display() {
        let err = PagemarkError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
