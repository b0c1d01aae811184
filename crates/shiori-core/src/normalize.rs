//! Text normalization for comparison keys, titles, and author names.
//!
//! All functions here are pure and total. Normalized forms are derived
//! values used only for comparison and are never persisted.
//!
//! Japanese book metadata mixes half- and full-width punctuation, several
//! dash variants, and decorative brackets; NFKC plus a shared punctuation
//! class folds all of those before any fuzzy comparison happens.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Punctuation and whitespace characters treated as word separators.
///
/// Covers ASCII, full-width, and CJK bracket/quote forms plus every dash
/// variant seen in titles.
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\s\-‐‑–—―〜~:：、。・,.;/\\()（）\[\]{}【】「」『』"'!！?？·•°]+"#)
        .expect("punctuation regex")
});

/// Trailing edition words stripped from titles before comparison.
static EDITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(新版|改訂|増補|決定版|図解|完全版|要約|入門)$").expect("edition regex"));

/// A trailing parenthetical, half- or full-width.
static TRAILING_PAREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[（(].*?[）)]$").expect("trailing paren regex"));

/// Whitespace runs, for key normalization.
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Digits and underscores, dropped from keys so `action_1` == `action`.
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9_]+").expect("digit regex"));

/// ASCII symbol ranges (space..`/`, `:`..`@`, `[`..`` ` ``, `{`..`~`).
/// CJK characters are untouched.
static ASCII_SYM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ -/:-@\[-`{-~]").expect("ascii symbol regex"));

/// Subtitle separators, in the order they are tried.
const SUBTITLE_SEPARATORS: [&str; 9] = [":", "：", "-", "ー", "—", "―", "–", "〜", "~"];

/// Apply Unicode NFKC (canonical-compatibility) normalization.
pub fn nfkc(s: &str) -> String {
    s.nfkc().collect()
}

/// Normalize a mapping key or alias for containment comparison.
///
/// NFKC, lowercase, then drop whitespace, digits, underscores, and ASCII
/// symbols. `"Core_Message 1"` and `"coremessage"` normalize identically.
pub fn normalize_key(s: &str) -> String {
    let s = nfkc(s).to_lowercase();
    let s = WS_RE.replace_all(&s, "");
    let s = DIGIT_RE.replace_all(&s, "");
    ASCII_SYM_RE.replace_all(&s, "").into_owned()
}

/// Normalize an author name for matching.
///
/// `ジョン・スミス` and `ジョンスミス` normalize to the same string.
pub fn normalize_author(s: &str) -> String {
    let s = nfkc(s).to_lowercase();
    PUNCT_RE.replace_all(&s, "").into_owned()
}

/// Truncate a title at its subtitle and strip edition decorations.
///
/// Cuts at the first subtitle separator (colon-like or dash-like), removes
/// a trailing parenthetical, and drops trailing edition words such as
/// 新版 or 図解.
pub fn strip_subtitle(title: &str) -> String {
    let mut t = nfkc(title);
    for sep in SUBTITLE_SEPARATORS {
        if let Some(pos) = t.find(sep) {
            t.truncate(pos);
        }
    }
    let t = TRAILING_PAREN_RE.replace(&t, "");
    let t = EDITION_RE.replace(&t, "");
    t.trim().to_string()
}

/// Normalize a title for matching: subtitle-stripped, case-folded,
/// punctuation-free.
pub fn normalize_title(s: &str) -> String {
    let s = strip_subtitle(s).to_lowercase();
    PUNCT_RE.replace_all(&s, "").into_owned()
}

/// Clean a note's display title for use in link text.
///
/// Strips the decorative brain marker the note template prepends.
pub fn clean_display_title(title: &str) -> String {
    let t = nfkc(title);
    t.trim_start_matches(['🧠', ' ']).trim().to_string()
}
