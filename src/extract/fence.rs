//! Markdown fence stripping

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Triple-backtick marker with optional language tag (```json, ```JSON5, ```)
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("fence regex is valid"));

/// Remove every fence marker wherever it appears, then trim
///
/// Markers inside JSON strings are removed too, so the result is only fit
/// for emptiness checks and error previews, never for parsing.
/// Returns `Cow::Borrowed` when the text has no fences.
pub fn strip_fences(text: &str) -> Cow<'_, str> {
    if !text.contains("```") {
        return Cow::Borrowed(text.trim());
    }
    match FENCE_RE.replace_all(text, "") {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
    }
}
