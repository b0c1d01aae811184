//! Extraction of "doable today" action items.
//!
//! Yields at most three short action strings. Candidates longer than 36
//! characters or mentioning a long-horizon time frame are dropped; the
//! budget mirrors the "executable in 15-30 minutes" instruction the
//! research prompt gives the model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::trace;

use shiori_core::normalize_key;

use crate::extract::ExtractionPayload;
use crate::prose::{grab_section, split_candidate_lines};
use crate::repair::{json_object_from_text, strip_code_fences};
use crate::spec::{all_section_labels, default_field_specs};

/// Maximum action length in chars; anything longer is not "today" work.
const MAX_ACTION_CHARS: usize = 36;

/// Maximum number of actions returned.
const MAX_ACTIONS: usize = 3;

/// Key aliases locating the action bucket, normalized before comparison.
const BUCKET_ALIASES: [&str; 11] = [
    "今日できるアクション",
    "今日できる行動",
    "今日行えるアクション",
    "todayactions",
    "today_action",
    "immediateactions",
    "実践",
    "アクション",
    "具体行動",
    "actions",
    "recommendations",
];

/// Keys read off an action entry object.
const ITEM_KEYS: [&str; 5] = ["action", "アクション", "行動", "todo", "内容"];

/// Keys read off an action bucket that is itself a mapping.
const BUCKET_MAP_KEYS: [&str; 8] = ["action", "アクション", "行動", "todo", "内容", "1", "2", "3"];

/// Section labels for the prose fallback.
const PROSE_LABELS: [&str; 5] =
    ["今日できるアクション", "今日行えるアクション", "実践への示唆", "実践", "アクション"];

/// Markers that push an action beyond today's scope.
const LONG_HORIZON_MARKERS: [&str; 7] = ["来週", "来月", "来年", "半年", "四半期", "年間", "長期計画"];

static EDGE_QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[「」『』“”"'\s]+|[「」『』“”"'\s]+$"#).expect("edge quote regex"));

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("multi space regex"));

/// Strip surrounding quotes, collapse internal whitespace, drop a trailing
/// full stop.
fn normalize_action(s: &str) -> String {
    let s = EDGE_QUOTE_RE.replace_all(s, "");
    let s = MULTI_SPACE_RE.replace_all(&s, " ");
    s.trim().trim_end_matches(['。', '.']).to_string()
}

/// Whether an action is doable today: short enough and free of
/// long-horizon temporal markers.
fn is_today_scope(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if LONG_HORIZON_MARKERS.iter().any(|m| s.contains(m)) {
        return false;
    }
    s.chars().count() <= MAX_ACTION_CHARS
}

/// Locate the action bucket by normalized-key containment, recursing into
/// nested mappings and the mappings inside lists.
fn find_bucket<'a>(map: &'a Map<String, Value>, aliases_norm: &[String]) -> Option<&'a Value> {
    for (key, v) in map {
        let nk = normalize_key(key);
        if !nk.is_empty()
            && aliases_norm
                .iter()
                .any(|a| !a.is_empty() && (nk.contains(a.as_str()) || a.contains(nk.as_str())))
            && !v.is_null()
        {
            return Some(v);
        }
        match v {
            Value::Object(inner) => {
                if let Some(found) = find_bucket(inner, aliases_norm) {
                    return Some(found);
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(inner) = item {
                        if let Some(found) = find_bucket(inner, aliases_norm) {
                            return Some(found);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn candidates_from_bucket(bucket: &Value) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    match bucket {
        Value::Array(entries) => {
            for entry in entries {
                match entry {
                    Value::String(s) if !s.trim().is_empty() => items.push(s.trim().to_string()),
                    Value::Object(map) => {
                        for key in ITEM_KEYS {
                            if let Some(Value::String(s)) = map.get(key) {
                                if !s.trim().is_empty() {
                                    items.push(s.trim().to_string());
                                    break;
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            for key in BUCKET_MAP_KEYS {
                match map.get(key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => {
                        items.push(s.trim().to_string())
                    }
                    Some(Value::Array(list)) => {
                        for v in list {
                            if let Value::String(s) = v {
                                if !s.trim().is_empty() {
                                    items.push(s.trim().to_string());
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::String(s) => items.extend(split_candidate_lines(s)),
        _ => {}
    }
    items
}

/// Extract up to three short, doable-today action strings.
///
/// Locates the action bucket structurally when possible, else scans the
/// prose section; candidates are normalized, scope-filtered, and
/// deduplicated. Never fails; the result may be empty.
pub fn extract_actions(payload: &ExtractionPayload) -> Vec<String> {
    let aliases_norm: Vec<String> = BUCKET_ALIASES.iter().map(|a| normalize_key(a)).collect();

    let recovered;
    let bucket = match payload {
        ExtractionPayload::Mapping(map) => find_bucket(map, &aliases_norm),
        ExtractionPayload::Text(text) => {
            recovered = json_object_from_text(text);
            recovered.as_ref().and_then(|v| match v {
                Value::Object(map) => find_bucket(map, &aliases_norm),
                _ => None,
            })
        }
    };

    let mut items: Vec<String> = bucket.map(candidates_from_bucket).unwrap_or_default();

    if items.is_empty() {
        let raw = strip_code_fences(payload.raw_text());
        let specs = default_field_specs();
        let stop_labels = all_section_labels(&specs);
        if let Some(block) = grab_section(&PROSE_LABELS, &stop_labels, &raw) {
            items = split_candidate_lines(&block);
        }
    }

    let mut out: Vec<String> = Vec::new();
    for item in items {
        let action = normalize_action(&item);
        trace!(candidate = %action, "action candidate");
        if is_today_scope(&action) && !out.contains(&action) {
            out.push(action);
        }
        if out.len() >= MAX_ACTIONS {
            break;
        }
    }
    out
}
