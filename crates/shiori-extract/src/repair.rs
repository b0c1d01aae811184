//! Light JSON repair and recovery from raw model text.
//!
//! Tier 2 of the extraction chain: responses frequently wrap JSON in code
//! fences, use typographic quotes, or leave trailing commas. This module
//! repairs those artifacts and pulls the first parseable object out of a
//! blob of text. An object that decodes to `{}` is rejected — a response
//! claiming to be JSON but carrying nothing must fall through to prose
//! scanning instead of being trusted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("code fence regex"));

static TRAILING_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([\]\}])").expect("trailing comma regex"));

/// First bracketed span in a text, greedy so nested objects stay intact.
static JSON_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").expect("json span regex"));

/// Remove fenced code blocks entirely.
pub fn strip_code_fences(s: &str) -> String {
    CODE_FENCE_RE.replace_all(s, "").into_owned()
}

/// Normalize typographic quotes and drop trailing commas before closing
/// brackets.
pub fn soft_json_fix(s: &str) -> String {
    let s = s
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'");
    TRAILING_COMMA_RE.replace_all(&s, "$1").into_owned()
}

fn parse_object(s: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(Value::Object(map)),
        // An array of objects stands in for its first element.
        Ok(Value::Array(arr)) => arr
            .into_iter()
            .next()
            .filter(|v| matches!(v, Value::Object(m) if !m.is_empty())),
        _ => None,
    }
}

/// Recover the first JSON object embedded in raw text, after light repair.
///
/// Tries the whole (fence-stripped, repaired) text when it is bracketed,
/// then the first `{...}`/`[...]` span. Returns `None` when nothing
/// parses to a non-empty object.
pub fn json_object_from_text(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    let s = soft_json_fix(&strip_code_fences(text));
    let s = s.trim();

    if (s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']')) {
        if let Some(v) = parse_object(s) {
            return Some(v);
        }
    }
    let span = JSON_SPAN_RE.find(s)?;
    parse_object(&soft_json_fix(span.as_str()))
}
