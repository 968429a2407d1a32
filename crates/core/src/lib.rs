pub mod dom;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod markdown;
pub mod parse;
pub mod pipeline;
pub mod sanitize;
pub mod scoring;

pub use dom::DomNode;
pub use error::{PagemarkError, Result};
pub use extract::{ExtractConfig, Extraction, extract_content};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url};
pub use markdown::{ConversionRule, RenderContext, render_markdown};
pub use parse::{decode, parse_document};
pub use pipeline::{Conversion, Mode, PipelineConfig, convert, convert_bytes, convert_with_config};
pub use sanitize::{SanitizeConfig, sanitize};
pub use scoring::{Classification, ScoreConfig, ScoreResult, calculate_score, link_density};
