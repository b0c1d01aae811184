//! Fuzzy entity matching for book titles and author names.
//!
//! Both match functions operate on *normalized* strings (see
//! [`crate::normalize`]) and are pure and total. Title matching is
//! permissive (partial titles are common in cross-references); author
//! matching is length-gated so a short given name cannot match every
//! author containing it.

use similar::TextDiff;

/// Minimum similarity ratio for a fuzzy title match.
const TITLE_SIMILARITY_THRESHOLD: f32 = 0.85;

/// Minimum similarity ratio for a fuzzy author match.
const AUTHOR_SIMILARITY_THRESHOLD: f32 = 0.93;

/// Minimum normalized length (in chars) before non-exact author
/// comparisons are allowed.
const AUTHOR_MIN_LEN: usize = 6;

/// Minimum length ratio for substring-based author matching.
const AUTHOR_LEN_RATIO: f32 = 0.8;

/// Character-level similarity ratio between two strings.
///
/// Twice the number of matched characters in the longest common
/// matching-block alignment, divided by the combined length. This is the
/// ratio-of-matches definition, not edit distance.
pub fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Whether two normalized titles refer to the same book.
///
/// True on equality, substring containment in either direction (short
/// alias vs. long official title), or similarity ≥ 0.85.
pub fn title_matches(a_norm: &str, b_norm: &str) -> bool {
    if a_norm.is_empty() || b_norm.is_empty() {
        return false;
    }
    if a_norm == b_norm {
        return true;
    }
    if a_norm.contains(b_norm) || b_norm.contains(a_norm) {
        return true;
    }
    similarity(a_norm, b_norm) >= TITLE_SIMILARITY_THRESHOLD
}

/// Whether two normalized author names refer to the same person.
///
/// Exact equality always matches. Otherwise the shorter name must be at
/// least 6 chars, and either containment with a length ratio ≥ 0.8 or
/// similarity ≥ 0.93 is required. The length gate keeps a lone given name
/// like ジョン from matching every author that contains it.
pub fn author_matches(a_norm: &str, b_norm: &str) -> bool {
    if a_norm.is_empty() || b_norm.is_empty() {
        return false;
    }
    if a_norm == b_norm {
        return true;
    }
    let la = a_norm.chars().count();
    let lb = b_norm.chars().count();
    let lmin = la.min(lb);
    let lmax = la.max(lb);
    if lmin < AUTHOR_MIN_LEN {
        return false;
    }
    let len_ratio = lmin as f32 / lmax as f32;
    if len_ratio >= AUTHOR_LEN_RATIO && (a_norm.contains(b_norm) || b_norm.contains(a_norm)) {
        return true;
    }
    similarity(a_norm, b_norm) >= AUTHOR_SIMILARITY_THRESHOLD
}
