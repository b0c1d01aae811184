//! Field specifications: names, key aliases, and prose section labels.

use serde::{Deserialize, Serialize};

/// Canonical field names.
pub const CORE_MESSAGE: &str = "core_message";
pub const EXECUTIVE_SUMMARY: &str = "executive_summary";
pub const RELATED_BOOKS: &str = "related_books";
pub const PRACTICAL_ACTIONS: &str = "practical_actions";

/// Which tier of the fallback chain produced a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Direct key lookup in an already-parsed mapping.
    #[serde(rename = "tier1_structured")]
    Tier1Structured,
    /// Key lookup over a JSON object recovered from raw text.
    #[serde(rename = "tier2_keydig")]
    Tier2KeyDig,
    /// Labeled-section scan of raw prose.
    #[serde(rename = "tier3_prose")]
    Tier3Prose,
    /// Leading-characters fallback for the two summary fields.
    #[serde(rename = "tier4_truncated")]
    Tier4Truncated,
    /// Nothing could be extracted.
    #[serde(rename = "empty")]
    Empty,
}

/// How captured prose lines are joined into the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Preserve line structure.
    Block,
    /// Slash-join entries, the display form used for entity lists.
    SlashList,
}

/// A named field plus the aliases and labels used to locate it.
///
/// Aliases cover the synonyms, translations, and known misspellings models
/// produce for a key; section labels are the headings used when falling
/// back to prose scanning.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Candidate key aliases, compared after key normalization.
    pub aliases: &'static [&'static str],
    /// Prose section labels, compared literally at line starts.
    pub section_labels: &'static [&'static str],
    pub render: RenderStyle,
    /// Tier-4 budget: return this many leading chars of the raw text when
    /// every other tier fails. `None` means fall through to empty.
    pub truncate_chars: Option<usize>,
}

/// The field set this system extracts from a research response.
///
/// Alias lists intentionally include the misspelling `core_messeage` and
/// the romanized variants observed in real model output.
pub fn default_field_specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            name: CORE_MESSAGE,
            aliases: &[
                "核心的メッセージ",
                "核心メッセージ",
                "core_message",
                "coremessage",
                "core_messeage",
            ],
            section_labels: &["核心的メッセージ", "核心メッセージ", "Core Message"],
            render: RenderStyle::Block,
            truncate_chars: Some(350),
        },
        FieldSpec {
            name: EXECUTIVE_SUMMARY,
            aliases: &[
                "エグゼクティブ・サマリー",
                "エグゼクティブサマリー",
                "executive_summary",
                "execsummary",
                "executivesummary",
            ],
            section_labels: &[
                "エグゼクティブ・サマリー",
                "エグゼクティブサマリー",
                "Executive Summary",
                "要約",
                "概要",
                "まとめ",
            ],
            render: RenderStyle::Block,
            truncate_chars: Some(600),
        },
        FieldSpec {
            name: RELATED_BOOKS,
            aliases: &["関連書籍", "related_books", "relatedbooks", "参考文献", "関連文献"],
            section_labels: &["関連書籍", "Related Books", "参考文献", "関連文献"],
            render: RenderStyle::SlashList,
            truncate_chars: None,
        },
        FieldSpec {
            name: PRACTICAL_ACTIONS,
            aliases: &[
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
            ],
            section_labels: &[
                "今日できるアクション",
                "今日行えるアクション",
                "実践への示唆",
                "実践",
                "アクション",
            ],
            render: RenderStyle::SlashList,
            truncate_chars: None,
        },
    ]
}

/// Every section label across all fields; used as the stop set when
/// scanning prose for one field's section.
pub fn all_section_labels(specs: &[FieldSpec]) -> Vec<&'static str> {
    specs.iter().flat_map(|s| s.section_labels.iter().copied()).collect()
}
