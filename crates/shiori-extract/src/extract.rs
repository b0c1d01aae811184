//! The tiered field extractor.
//!
//! For each field the tiers run in strict precedence, stopping at the
//! first non-empty value:
//!
//! 1. structured key lookup in an already-parsed mapping
//! 2. key lookup over a JSON object recovered from raw text
//! 3. labeled-section scan of the prose
//! 4. leading-characters fallback (summary fields only)
//!
//! A post-pass guard re-parses any value that itself looks like a JSON
//! blob, catching tiers that captured nested JSON verbatim instead of the
//! intended scalar. The extractor never fails; a missing field is the
//! empty string tagged [`Provenance::Empty`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use shiori_core::normalize_key;

use crate::prose::grab_section;
use crate::repair::{json_object_from_text, strip_code_fences};
use crate::spec::{all_section_labels, FieldSpec, Provenance, RenderStyle};

/// Display keys tried when rendering a mapping without a direct textual
/// field.
const DISPLAY_KEYS: [&str; 7] = ["text", "value", "content", "概要", "要約", "summary", "message"];

/// Input to one extraction call: an already-parsed mapping or raw text.
#[derive(Debug, Clone)]
pub enum ExtractionPayload {
    Mapping(Map<String, Value>),
    Text(String),
}

impl ExtractionPayload {
    /// Wrap a JSON value: objects become mappings, everything else is
    /// treated as raw text.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ExtractionPayload::Mapping(map),
            Value::String(s) => ExtractionPayload::Text(s),
            other => ExtractionPayload::Text(other.to_string()),
        }
    }

    /// The raw text view used by the prose tiers.
    ///
    /// Research responses conventionally carry their unparsed text under a
    /// `raw` key next to the structured fields; a mapping payload exposes
    /// that so an empty or hollow mapping can still fall through to prose
    /// scanning.
    pub fn raw_text(&self) -> &str {
        match self {
            ExtractionPayload::Mapping(map) => {
                map.get("raw").and_then(Value::as_str).unwrap_or("")
            }
            ExtractionPayload::Text(s) => s,
        }
    }
}

/// One extracted field value with its provenance tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    pub value: String,
    pub provenance: Provenance,
}

/// Mapping from field name to extracted value.
///
/// A field is never null: absent information is the empty string with
/// [`Provenance::Empty`].
#[derive(Debug, Clone, Default)]
pub struct ExtractedRecord {
    fields: BTreeMap<String, ExtractedField>,
}

impl ExtractedRecord {
    /// The field value, or the empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |f| f.value.as_str())
    }

    /// Which tier produced the field.
    pub fn provenance(&self, name: &str) -> Provenance {
        self.fields.get(name).map_or(Provenance::Empty, |f| f.provenance)
    }

    fn insert(&mut self, name: &str, value: String, provenance: Provenance) {
        self.fields.insert(name.to_string(), ExtractedField { value, provenance });
    }
}

/// Whether a value counts as absent for key lookup purposes.
fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

/// Depth-first search for a key whose normalized form contains, or is
/// contained by, one of the normalized aliases.
///
/// Traversal order is deterministic: object insertion order, then list
/// order. Keys holding empty values are passed over so a hollow match
/// cannot shadow a real one deeper in.
fn dig_value<'a>(value: &'a Value, aliases_norm: &[String]) -> Option<&'a Value> {
    let Value::Object(map) = value else {
        return None;
    };
    dig_map(map, aliases_norm)
}

fn dig_map<'a>(map: &'a Map<String, Value>, aliases_norm: &[String]) -> Option<&'a Value> {
    for (key, v) in map {
        let nk = normalize_key(key);
        let key_matches = !nk.is_empty()
            && aliases_norm
                .iter()
                .any(|a| !a.is_empty() && (nk.contains(a.as_str()) || a.contains(nk.as_str())));
        if key_matches && !is_empty_value(v) {
            return Some(v);
        }
        match v {
            Value::Object(_) => {
                if let Some(found) = dig_value(v, aliases_norm) {
                    return Some(found);
                }
            }
            Value::Array(items) => {
                for item in items {
                    if item.is_object() {
                        if let Some(found) = dig_value(item, aliases_norm) {
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

/// Render an arbitrary value to display text.
///
/// Lists slash-join their recursively rendered elements; mappings fall
/// back to a display key, then to verbatim serialization.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> =
                items.iter().map(value_to_text).filter(|s| !s.is_empty()).collect();
            parts.join(" / ")
        }
        Value::Object(map) => {
            for key in DISPLAY_KEYS {
                if let Some(Value::String(s)) = map.get(key) {
                    if !s.trim().is_empty() {
                        return s.trim().to_string();
                    }
                }
            }
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

fn entity_string_field(map: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(v) = map.get(*key) {
            let s = value_to_text(v);
            if !s.is_empty() {
                return s;
            }
        }
    }
    String::new()
}

/// Render a list of related-book entities as `Title（Author）: reason`,
/// slash-joined, omitting whichever parts are missing.
fn format_related(value: &Value) -> String {
    let Value::Array(items) = value else {
        return value_to_text(value);
    };
    let mut parts: Vec<String> = Vec::new();
    for item in items {
        let rendered = match item {
            Value::String(s) => s.trim().to_string(),
            Value::Object(map) => {
                let title = entity_string_field(map, &["書名", "title", "name"]);
                let author = entity_string_field(map, &["著者", "author", "authors"]);
                let reason = entity_string_field(map, &["関連性", "reason", "説明"]);
                let base = if !title.is_empty() && !author.is_empty() {
                    format!("{title}（{author}）")
                } else if !title.is_empty() {
                    title
                } else {
                    author
                };
                match (base.is_empty(), reason.is_empty()) {
                    (false, false) => format!("{base}: {reason}"),
                    (false, true) => base,
                    (true, false) => reason,
                    (true, true) => String::new(),
                }
            }
            other => value_to_text(other),
        };
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }
    parts.join(" / ")
}

fn render_field(spec: &FieldSpec, value: &Value) -> String {
    match spec.render {
        RenderStyle::SlashList => format_related(value),
        RenderStyle::Block => value_to_text(value),
    }
}

/// Re-parse guard: when an extracted value is itself a JSON blob, dig the
/// field's aliases out of it instead of keeping the blob verbatim.
fn reparse_guard(spec: &FieldSpec, aliases_norm: &[String], value: String) -> String {
    let trimmed = value.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return value;
    }
    if let Some(parsed) = json_object_from_text(&value) {
        if let Some(inner) = dig_value(&parsed, aliases_norm) {
            let rendered = render_field(spec, inner);
            if !rendered.is_empty() {
                return rendered;
            }
        }
    }
    value
}

/// Extract every field named in `specs` from the payload.
///
/// Total and infallible: inability to extract a field yields the empty
/// string with [`Provenance::Empty`].
pub fn extract(payload: &ExtractionPayload, specs: &[FieldSpec]) -> ExtractedRecord {
    let stop_labels = all_section_labels(specs);
    let raw_text = payload.raw_text();
    let prose = strip_code_fences(raw_text);
    // Tier 2 recovery happens once; every field digs the same object.
    let recovered = json_object_from_text(raw_text);

    let mut record = ExtractedRecord::default();
    for spec in specs {
        let aliases_norm: Vec<String> = spec.aliases.iter().map(|a| normalize_key(a)).collect();

        let (value, provenance) = extract_field(
            spec,
            &aliases_norm,
            payload,
            recovered.as_ref(),
            &prose,
            &stop_labels,
        );
        let value = reparse_guard(spec, &aliases_norm, value);
        debug!(field = spec.name, tier = ?provenance, value_len = value.len(), "field extracted");
        record.insert(spec.name, value, provenance);
    }
    record
}

fn extract_field(
    spec: &FieldSpec,
    aliases_norm: &[String],
    payload: &ExtractionPayload,
    recovered: Option<&Value>,
    prose: &str,
    stop_labels: &[&str],
) -> (String, Provenance) {
    // Tier 1: structured lookup
    if let ExtractionPayload::Mapping(map) = payload {
        if let Some(v) = dig_map(map, aliases_norm) {
            let rendered = render_field(spec, v);
            if !rendered.is_empty() {
                return (rendered, Provenance::Tier1Structured);
            }
        }
    }

    // Tier 2: key dig over the recovered object
    if let Some(root) = recovered {
        if let Some(v) = dig_value(root, aliases_norm) {
            let rendered = render_field(spec, v);
            if !rendered.is_empty() {
                return (rendered, Provenance::Tier2KeyDig);
            }
        }
    }

    // Tier 3: labeled-section scan
    if let Some(body) = grab_section(spec.section_labels, stop_labels, prose) {
        let rendered = match spec.render {
            RenderStyle::SlashList => {
                body.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" / ")
            }
            RenderStyle::Block => body,
        };
        if !rendered.is_empty() {
            return (rendered, Provenance::Tier3Prose);
        }
    }

    // Tier 4: truncated fallback, summary fields only
    if let Some(budget) = spec.truncate_chars {
        let text = prose.trim();
        if !text.is_empty() {
            return (text.chars().take(budget).collect(), Provenance::Tier4Truncated);
        }
    }

    (String::new(), Provenance::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{default_field_specs, CORE_MESSAGE, EXECUTIVE_SUMMARY, RELATED_BOOKS};
    use serde_json::json;

    fn payload_from(v: Value) -> ExtractionPayload {
        ExtractionPayload::from_value(v)
    }

    #[test]
    fn test_tier1_direct_key() {
        let payload = payload_from(json!({"core_message": "継続は力なり"}));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "継続は力なり");
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Tier1Structured);
    }

    #[test]
    fn test_tier1_nested_and_aliased_key() {
        let payload = payload_from(json!({
            "analysis": {"核心メッセージ": "小さな習慣が大きな差を生む"}
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "小さな習慣が大きな差を生む");
    }

    #[test]
    fn test_tier1_key_inside_list_of_objects() {
        let payload = payload_from(json!({
            "sections": [{"intro": "x"}, {"executive_summary": "全体の要約"}]
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(EXECUTIVE_SUMMARY), "全体の要約");
    }

    #[test]
    fn test_tier1_empty_value_is_absent() {
        // The hollow first key must not shadow the real nested value.
        let payload = payload_from(json!({
            "core_message": "",
            "detail": {"core_message": "本命"}
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "本命");
    }

    #[test]
    fn test_tier_precedence_structured_wins_over_prose() {
        let payload = payload_from(json!({
            "core_message": "構造化された値",
            "raw": "核心的メッセージ:\nこちらは散文"
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "構造化された値");
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Tier1Structured);
    }

    #[test]
    fn test_empty_object_guard_falls_through_to_prose() {
        // A response claiming to be JSON but decoding to {} must not be
        // trusted; the prose next to it wins.
        let payload = payload_from(json!({
            "parsed": {},
            "raw": "核心的メッセージ:\n散文からの回収\n"
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "散文からの回収");
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Tier3Prose);
    }

    #[test]
    fn test_tier2_embedded_json() {
        let text = "結果は以下です。\n{\"executive_summary\": \"埋め込みJSONからの要約\"}\nどうぞ。";
        let payload = ExtractionPayload::Text(text.to_string());
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(EXECUTIVE_SUMMARY), "埋め込みJSONからの要約");
        assert_eq!(record.provenance(EXECUTIVE_SUMMARY), Provenance::Tier2KeyDig);
    }

    #[test]
    fn test_tier3_prose_sections() {
        let text = "核心的メッセージ:\n行動が思考を変える。\n\n関連書籍:\n- 本A（著者A）\n- 本B（著者B）\n";
        let payload = ExtractionPayload::Text(text.to_string());
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "行動が思考を変える。");
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Tier3Prose);
        assert_eq!(record.get(RELATED_BOOKS), "本A（著者A） / 本B（著者B）");
    }

    #[test]
    fn test_tier4_truncation_budgets() {
        let long_text: String = "あ".repeat(700);
        let payload = ExtractionPayload::Text(long_text);
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE).chars().count(), 350);
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Tier4Truncated);
        assert_eq!(record.get(EXECUTIVE_SUMMARY).chars().count(), 600);
        // No truncation fallback for entity fields
        assert_eq!(record.get(RELATED_BOOKS), "");
        assert_eq!(record.provenance(RELATED_BOOKS), Provenance::Empty);
    }

    #[test]
    fn test_empty_payload_yields_empty_fields() {
        let payload = ExtractionPayload::Text(String::new());
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "");
        assert_eq!(record.provenance(CORE_MESSAGE), Provenance::Empty);
    }

    #[test]
    fn test_related_books_entity_rendering() {
        let payload = payload_from(json!({
            "related_books": [
                {"書名": "1兆ドルコーチ", "著者": "ビル・キャンベル", "関連性": "リーダー論"},
                {"title": "Deep Work"},
                "文字列のまま"
            ]
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(
            record.get(RELATED_BOOKS),
            "1兆ドルコーチ（ビル・キャンベル）: リーダー論 / Deep Work / 文字列のまま"
        );
    }

    #[test]
    fn test_list_value_slash_joined() {
        let payload = payload_from(json!({"core_message": ["前半", "後半"]}));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "前半 / 後半");
    }

    #[test]
    fn test_mapping_display_key_rendering() {
        let payload = payload_from(json!({"core_message": {"text": "表示キー経由"}}));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "表示キー経由");
    }

    #[test]
    fn test_reparse_guard_unwraps_json_blob() {
        // Tier 1 catches a value that is itself serialized JSON.
        let payload = payload_from(json!({
            "core_message": "{\"core_message\": \"二重に包まれた値\"}"
        }));
        let record = extract(&payload, &default_field_specs());
        assert_eq!(record.get(CORE_MESSAGE), "二重に包まれた値");
    }

    #[test]
    fn test_never_panics_on_junk() {
        for junk in ["{{{", "]", "null", "[1,2,3]", "{\"a\": }"] {
            let payload = ExtractionPayload::Text(junk.to_string());
            let _ = extract(&payload, &default_field_specs());
        }
    }
}
