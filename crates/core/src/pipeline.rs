//! The conversion pipeline: parse → sanitize → (extract) → render.
//!
//! [`convert`] is a pure, single-threaded computation per call. Each
//! invocation owns its DOM tree outright and the static rule table and token
//! sets are read-only after initialization, so concurrent invocations never
//! share mutable state and an enclosing deadline may abandon an in-flight
//! call safely.
//!
//! # Example
//!
//! ```rust
//! use pagemark_core::{Mode, convert};
//!
//! let result = convert("<h1>Title</h1><p>Hello</p>", Mode::Detailed).unwrap();
//! assert_eq!(result.markdown, "# Title\n\nHello");
//! assert!(!result.used_fallback);
//! ```

use serde::Serialize;

use crate::extract::{ExtractConfig, extract_content};
use crate::markdown::render_markdown;
use crate::parse::{decode, parse_document};
use crate::sanitize::{SanitizeConfig, sanitize};
use crate::{PagemarkError, Result};

/// Conversion mode, selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Run readability extraction and render only the primary content.
    #[default]
    Summary,
    /// Bypass extraction and render the whole sanitized body.
    Detailed,
}

/// A successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The rendered Markdown, trimmed, blank-line runs collapsed.
    pub markdown: String,
    /// True when extraction found no sufficiently-scored candidate and fell
    /// back to the full sanitized body. Informational, not an error; always
    /// false in detailed mode.
    pub used_fallback: bool,
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Sanitizer removal set.
    pub sanitize: SanitizeConfig,
    /// Extraction scoring and selection knobs.
    pub extract: ExtractConfig,
}

/// Converts an HTML string to Markdown with default configuration.
///
/// Empty input yields [`PagemarkError::EmptyInput`]; no other pipeline stage
/// can fail, by design.
pub fn convert(html: &str, mode: Mode) -> Result<Conversion> {
    convert_with_config(html, mode, &PipelineConfig::default())
}

/// Converts raw bytes to Markdown.
///
/// Bytes that are not valid UTF-8 yield [`PagemarkError::DecodeError`].
pub fn convert_bytes(bytes: &[u8], mode: Mode) -> Result<Conversion> {
    let html = decode(bytes)?;
    convert(html, mode)
}

/// Converts an HTML string to Markdown with explicit configuration.
pub fn convert_with_config(html: &str, mode: Mode, config: &PipelineConfig) -> Result<Conversion> {
    if html.is_empty() {
        return Err(PagemarkError::EmptyInput);
    }

    let tree = parse_document(html);
    let tree = sanitize(tree, &config.sanitize);

    match mode {
        Mode::Summary => {
            let extraction = extract_content(&tree, &config.extract);
            Ok(Conversion {
                markdown: render_markdown(&extraction.root),
                used_fallback: extraction.used_fallback,
            })
        }
        Mode::Detailed => {
            let body = tree.find_element("body").unwrap_or(&tree);
            Ok(Conversion { markdown: render_markdown(body), used_fallback: false })
        }
    }
}
