//! Tier-3 labeled-section scanning over raw prose.
//!
//! A section heading line is an optionally numbered label, optionally
//! followed by a full-width parenthetical annotation and a colon. The body
//! runs until the next heading line matching *any* recognized label, so
//! one field's capture cannot swallow another field's section.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading bullet markers stripped from captured body lines.
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\-\*•・]\s*").expect("bullet regex"));

/// Leading bullet or numbering markers on action candidate lines.
static CANDIDATE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[\-\*•・\d.)\]]+\s*").expect("candidate marker regex"));

fn heading_regex(labels: &[&str]) -> Regex {
    let alternation = labels.iter().map(|l| regex::escape(l)).collect::<Vec<_>>().join("|");
    // optional "1." / "2)" numbering, the label, an optional （annotation）,
    // an optional colon, then any same-line remainder
    let pattern = format!(r"^\s*(?:\d+[.)]\s*)?(?:{alternation})(?:（[^）]*）)?\s*[:：]?\s*(.*)$");
    Regex::new(&pattern).expect("heading regex")
}

/// Capture the body of the first section headed by one of `labels`.
///
/// `stop_labels` is the full label set across all fields. Bullet markers
/// are stripped from each captured line. Returns `None` when no section
/// heading is found or the captured body is empty.
pub fn grab_section(labels: &[&str], stop_labels: &[&str], text: &str) -> Option<String> {
    if labels.is_empty() || text.trim().is_empty() {
        return None;
    }
    let start_re = heading_regex(labels);
    let stop_re = heading_regex(stop_labels);
    let normalized = text.replace("\r\n", "\n");

    let mut body: Vec<String> = Vec::new();
    let mut in_section = false;
    for line in normalized.lines() {
        let line = line.trim_end();
        if !in_section {
            if let Some(caps) = start_re.captures(line) {
                in_section = true;
                let rest = caps.get(1).map_or("", |m| m.as_str());
                if !rest.trim().is_empty() {
                    body.push(BULLET_RE.replace(rest.trim(), "").into_owned());
                }
            }
            continue;
        }
        if stop_re.is_match(line) {
            break;
        }
        body.push(BULLET_RE.replace(line.trim_start(), "").into_owned());
    }

    let joined = body.join("\n").trim().to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Split a string bucket into candidate lines, stripping bullet and
/// numbering markers.
pub fn split_candidate_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|ln| CANDIDATE_MARKER_RE.replace(ln, "").trim().to_string())
        .filter(|ln| !ln.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: &[&str] = &["核心的メッセージ", "Core Message"];
    const STOP: &[&str] = &["核心的メッセージ", "Core Message", "関連書籍", "Executive Summary"];

    #[test]
    fn test_grab_section_basic() {
        let text = "前置き\n核心的メッセージ:\n習慣は複利で効く。\n小さく始める。\n関連書籍:\n- 何か\n";
        let body = grab_section(LABELS, STOP, text).unwrap();
        assert_eq!(body, "習慣は複利で効く。\n小さく始める。");
    }

    #[test]
    fn test_grab_section_numbered_heading_with_annotation() {
        let text = "1. 核心的メッセージ（要点）：\n- 本質は継続。\n2. 関連書籍:\n- X\n";
        let body = grab_section(LABELS, STOP, text).unwrap();
        assert_eq!(body, "本質は継続。");
    }

    #[test]
    fn test_grab_section_body_on_heading_line() {
        let text = "Core Message: keep habits small\nother text\n";
        let body = grab_section(LABELS, STOP, text).unwrap();
        assert!(body.starts_with("keep habits small"));
    }

    #[test]
    fn test_grab_section_stops_at_other_label() {
        let text = "核心的メッセージ:\nひとこと\nExecutive Summary:\n長い要約\n";
        let body = grab_section(LABELS, STOP, text).unwrap();
        assert_eq!(body, "ひとこと");
    }

    #[test]
    fn test_grab_section_strips_bullets() {
        let text = "核心的メッセージ:\n- 一つ目\n・二つ目\n";
        let body = grab_section(LABELS, STOP, text).unwrap();
        assert_eq!(body, "一つ目\n二つ目");
    }

    #[test]
    fn test_grab_section_missing_label() {
        assert!(grab_section(LABELS, STOP, "何もない本文").is_none());
        assert!(grab_section(LABELS, STOP, "").is_none());
    }

    #[test]
    fn test_split_candidate_lines() {
        let lines = split_candidate_lines("- 朝に5分読む\n2) メモを取る\n\n・復習する");
        assert_eq!(lines, vec!["朝に5分読む", "メモを取る", "復習する"]);
    }
}
