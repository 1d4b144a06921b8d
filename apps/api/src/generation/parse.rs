//! Tolerant decoding of raw model output.
//!
//! Backends routinely ignore "return only JSON" instructions and wrap the
//! payload in prose or markdown fences, so decoding runs in two stages
//! instead of trusting the text as-is.

use serde::de::DeserializeOwned;

/// Decodes a JSON object out of raw model output.
///
/// Stage one decodes the whole text. Stage two takes the substring from the
/// first `{` to the last `}` and decodes that, which recovers objects wrapped
/// in prose or ```json fences. Either failure yields `None` so the caller can
/// move on to the next backend.
pub fn parse_json_object<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Ok(parsed) = serde_json::from_str(raw) {
        return Some(parsed);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Accepts raw model output verbatim as transformed text.
///
/// No trimming, no fence stripping. Only empty output counts as unusable.
pub fn parse_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
