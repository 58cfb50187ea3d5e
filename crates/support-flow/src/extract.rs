//! Structured extraction from untrusted completion output.
//!
//! Model responses may wrap a JSON object in prose, markdown fences, or
//! nothing at all. `extract_or` locates the most plausible JSON object,
//! decodes it, and returns the caller-supplied fallback on any failure.
//! It never panics and never returns an error — every call site owns its
//! own fallback so each stage degrades independently.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Extract a `T` from raw completion output, or return `fallback`.
pub fn extract_or<T: DeserializeOwned>(raw: &str, fallback: T) -> T {
    extract_or_validated(raw, fallback, |_| true)
}

/// Like [`extract_or`], but a decoded value must also pass `validate`
/// before it is accepted.
pub fn extract_or_validated<T, F>(raw: &str, fallback: T, validate: F) -> T
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let Some(json) = locate_json_object(raw) else {
        warn!(raw_len = raw.len(), "no JSON object in completion output, using fallback");
        return fallback;
    };

    match serde_json::from_str::<T>(json) {
        Ok(value) if validate(&value) => value,
        Ok(_) => {
            warn!("decoded completion output rejected by validator, using fallback");
            fallback
        }
        Err(e) => {
            warn!(error = %e, "completion output failed JSON decoding, using fallback");
            fallback
        }
    }
}

/// Locate a JSON object inside text that may contain surrounding prose.
///
/// Prefers a ```json fenced block; otherwise slices from the first `{` to
/// the last `}`. Absent or inverted braces mean there is nothing worth
/// handing to the decoder.
fn locate_json_object(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            let candidate = body[..end].trim();
            if !candidate.is_empty() {
                return Some(candidate);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
