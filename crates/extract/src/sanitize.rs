//! Best-effort recovery of JSON from free-form model replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::warn;

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```json\s*").expect("valid fence regex"));
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```$").expect("valid fence regex"));

/// Strip a leading "```json" marker and a trailing "```" marker.
///
/// Input that is already clean, such as the output of a single fenced reply,
/// passes through unchanged. Only one marker is removed from each end, so
/// stacked fences need more than one pass.
pub fn clean_json(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_open = FENCE_OPEN.replace(trimmed, "");
    let without_close = FENCE_CLOSE.replace(&without_open, "");
    without_close.trim().to_string()
}

/// Strictly decode a cleaned reply.
pub fn try_parse<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(&clean_json(raw))
}

/// Decode a reply, substituting `fallback()` when it is not the expected JSON.
///
/// The failure is only logged; callers always get a well-formed value.
pub fn parse_or_fallback<T, F>(stage: &str, raw: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match try_parse(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(stage, error = %e, "Model reply was not valid JSON, using fallback");
            fallback()
        }
    }
}
