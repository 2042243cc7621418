//! Lenient JSON recovery for model responses.
//!
//! Generation workers routinely get JSON wrapped in markdown fences or
//! padded with prose. Stripping the common wrappers before parsing saves a
//! worker round-trip; anything still unparseable is reported with an
//! excerpt so the failure is diagnosable from the stage result alone.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const EXCERPT_LEN: usize = 500;

/// Error from lenient JSON parsing.
#[derive(Debug, Error)]
pub enum LenientJsonError {
    /// The response was empty or whitespace.
    #[error("empty response text")]
    Empty,

    /// The cleaned text still failed to parse.
    #[error("failed to parse JSON: {source}; raw content: {excerpt}")]
    Parse {
        /// The underlying parse error.
        source: serde_json::Error,
        /// Up to the first 500 characters of the cleaned text.
        excerpt: String,
    },
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Opening fence with optional language tag, or a bare closing fence.
        Regex::new(r"(?m)^```[a-zA-Z]*\s*$|^```").unwrap()
    })
}

/// Parses JSON out of model response text, stripping markdown fences first.
///
/// # Errors
///
/// Returns [`LenientJsonError::Empty`] for blank input and
/// [`LenientJsonError::Parse`] when the cleaned text is not valid JSON.
pub fn parse_lenient_json(text: &str) -> Result<serde_json::Value, LenientJsonError> {
    if text.trim().is_empty() {
        return Err(LenientJsonError::Empty);
    }

    let cleaned = fence_pattern().replace_all(text, "");
    let cleaned = cleaned.trim();

    serde_json::from_str(cleaned).map_err(|source| LenientJsonError::Parse {
        source,
        excerpt: cleaned.chars().take(EXCERPT_LEN).collect(),
    })
}
