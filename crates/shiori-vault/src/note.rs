//! One on-disk note and the structure the linker reads out of it.
//!
//! Notes are plain markdown with a fixed shape: an optional front-matter
//! block, a `## 【 … Title 】` heading, a `- … 著者: Author` bullet, and a
//! `### … 関連書籍` section whose bullets hold `/`-separated segments of
//! the form `Title（Author）: annotation`. Lines keep their original
//! terminators so an untouched note writes back byte-for-byte.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use shiori_core::{normalize_author, normalize_title};

/// Title heading: `## 【 🧠 Title 】`.
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s*【\s*.*?\s*(?P<title>.+?)\s*】\s*$").expect("title regex"));

/// Author bullet: `- 👤 著者: Author`.
static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*]\s*[^\n]*?著者\s*[:：]\s*(?P<author>.+?)\s*$").expect("author regex")
});

/// Segment separator inside a related-books bullet.
static SEGMENT_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*/\s*").expect("segment regex"));

/// Label identifying the related-books section heading.
const RELATED_LABEL: &str = "関連書籍";

/// Heading line appended when a note has no related-books section.
const RELATED_HEADING: &str = "### 📚 関連書籍\n";

/// One comma/slash-delimited entry inside a related-books bullet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSegment {
    pub raw: String,
    /// Parsed `(title, author, trailing text)`, when the segment has the
    /// `Title（Author）…` shape.
    pub parsed: Option<(String, String, String)>,
    /// Segments that already contain link markup are never rewritten.
    pub linked: bool,
}

impl RelatedSegment {
    pub fn new(raw: &str) -> Self {
        let linked = raw.contains("[[");
        let parsed = parse_title_author(raw);
        Self {
            raw: raw.to_string(),
            parsed,
            linked,
        }
    }
}

/// Span of the rightmost parenthesized group, preferring full-width
/// brackets. Returns byte offsets of the open and close characters.
fn paren_span(seg: &str) -> Option<(usize, usize, usize, usize)> {
    if let (Some(o), Some(c)) = (seg.rfind('（'), seg.rfind('）')) {
        if o < c {
            return Some((o, '（'.len_utf8(), c, '）'.len_utf8()));
        }
    }
    if let (Some(o), Some(c)) = (seg.rfind('('), seg.rfind(')')) {
        if o < c {
            return Some((o, 1, c, 1));
        }
    }
    None
}

fn parse_title_author(seg: &str) -> Option<(String, String, String)> {
    let (open, open_len, close, close_len) = paren_span(seg)?;
    let title = seg[..open].trim().to_string();
    let author = seg[open + open_len..close].trim().to_string();
    let tail = seg[close + close_len..].to_string();
    if title.is_empty() || author.is_empty() {
        return None;
    }
    Some((title, author, tail))
}

/// Split a related-books bullet line into its segments.
pub fn split_segments(bullet_line: &str) -> Vec<String> {
    let mut s = bullet_line.trim();
    if let Some(rest) = s.strip_prefix('-').or_else(|| s.strip_prefix('*')) {
        s = rest.trim();
    }
    if s.is_empty() {
        return Vec::new();
    }
    SEGMENT_SPLIT_RE.split(s).map(str::to_string).collect()
}

/// Rebuild a bullet line from segments.
pub fn join_segments(segments: &[String]) -> String {
    format!("- {}\n", segments.join(" / "))
}

/// One note file held in memory.
#[derive(Debug, Clone)]
pub struct Note {
    pub path: PathBuf,
    /// Link target: the filename without extension.
    pub stem: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub title_norm: Option<String>,
    pub author_norm: Option<String>,
    /// Raw lines including their original terminators.
    pub lines: Vec<String>,
    /// Set when the in-memory buffer diverges from disk.
    pub dirty: bool,
}

impl Note {
    /// Parse note content. A missing heading or author bullet leaves the
    /// corresponding fields `None`; the note still loads.
    pub fn parse(path: PathBuf, content: &str) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();

        let title = lines
            .iter()
            .find_map(|l| TITLE_RE.captures(l.trim_end()))
            .map(|c| c["title"].trim().to_string());
        let author = lines
            .iter()
            .find_map(|l| AUTHOR_RE.captures(l.trim_end()))
            .map(|c| c["author"].trim().to_string());

        let title_norm = title.as_deref().map(normalize_title).filter(|s| !s.is_empty());
        let author_norm = author.as_deref().map(normalize_author).filter(|s| !s.is_empty());

        Self {
            path,
            stem,
            title,
            author,
            title_norm,
            author_norm,
            lines,
            dirty: false,
        }
    }

    /// Locate the related-books section: `(start, end)` line indices where
    /// `start` is the heading and `end` is exclusive.
    pub fn related_section(&self) -> Option<(usize, usize)> {
        let start = self.lines.iter().position(|l| {
            let t = l.trim();
            t.starts_with("###") && t.contains(RELATED_LABEL)
        })?;
        let end = self.lines[start + 1..]
            .iter()
            .position(|l| l.trim().starts_with("### "))
            .map(|off| start + 1 + off)
            .unwrap_or(self.lines.len());
        Some((start, end))
    }

    /// Locate the related-books section, creating an empty one at the end
    /// of the note when absent.
    pub fn ensure_related_section(&mut self) -> (usize, usize) {
        if let Some(span) = self.related_section() {
            return span;
        }
        if let Some(last) = self.lines.last_mut() {
            if !last.is_empty() && !last.ends_with('\n') {
                last.push('\n');
            }
        }
        self.lines.push("\n".to_string());
        self.lines.push(RELATED_HEADING.to_string());
        self.dirty = true;
        (self.lines.len() - 1, self.lines.len())
    }

    /// Full note content as written to disk.
    pub fn content(&self) -> String {
        self.lines.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\ntags: [books]\n---\n\n## 【 🧠 習慣の力 】\n\n### 📚 基本情報 \n- 👤 著者:チャールズ・デュヒッグ\n\n### 📚 関連書籍\n- 1兆ドルコーチ（ビル・キャンベル）: 補足\n";

    fn sample_note() -> Note {
        Note::parse(PathBuf::from("/vault/Books-2026-01-01.md"), SAMPLE)
    }

    #[test]
    fn test_parse_title_and_author() {
        let note = sample_note();
        assert_eq!(note.title.as_deref(), Some("🧠 習慣の力"));
        assert_eq!(note.author.as_deref(), Some("チャールズ・デュヒッグ"));
        assert_eq!(note.stem, "Books-2026-01-01");
        assert!(note.title_norm.is_some());
        assert!(note.author_norm.is_some());
    }

    #[test]
    fn test_parse_survives_missing_metadata() {
        let note = Note::parse(PathBuf::from("/vault/Books-x.md"), "just some text\n");
        assert!(note.title.is_none());
        assert!(note.author.is_none());
        assert!(note.title_norm.is_none());
    }

    #[test]
    fn test_related_section_span() {
        let note = sample_note();
        let (start, end) = note.related_section().unwrap();
        assert!(note.lines[start].contains(RELATED_LABEL));
        assert_eq!(end, note.lines.len());
    }

    #[test]
    fn test_related_section_ends_at_next_heading() {
        let text = "## 【 T 】\n### 📚 関連書籍\n- X（Y）\n### 次の節\nbody\n";
        let note = Note::parse(PathBuf::from("/vault/Books-a.md"), text);
        let (start, end) = note.related_section().unwrap();
        assert_eq!(start, 1);
        assert_eq!(end, 3);
    }

    #[test]
    fn test_ensure_related_section_creates_heading() {
        let mut note = Note::parse(PathBuf::from("/vault/Books-b.md"), "## 【 T 】\nbody");
        assert!(note.related_section().is_none());
        let (start, end) = note.ensure_related_section();
        assert!(note.lines[start].contains(RELATED_LABEL));
        assert_eq!(end, note.lines.len());
        assert!(note.dirty);
        // The previously unterminated last line gained a newline
        assert!(note.lines[1].ends_with('\n'));
    }

    #[test]
    fn test_split_and_join_segments() {
        let segs = split_segments("- 本A（著者A） / 本B（著者B）: 補足\n");
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], "本A（著者A）");
        assert_eq!(join_segments(&segs), "- 本A（著者A） / 本B（著者B）: 補足\n");
    }

    #[test]
    fn test_segment_parsing_full_width() {
        let seg = RelatedSegment::new("1兆ドルコーチ（ビル・キャンベル）: 補足");
        let (title, author, tail) = seg.parsed.unwrap();
        assert_eq!(title, "1兆ドルコーチ");
        assert_eq!(author, "ビル・キャンベル");
        assert_eq!(tail, ": 補足");
        assert!(!seg.linked);
    }

    #[test]
    fn test_segment_parsing_ascii_parens() {
        let seg = RelatedSegment::new("Deep Work (Cal Newport)");
        let (title, author, tail) = seg.parsed.unwrap();
        assert_eq!(title, "Deep Work");
        assert_eq!(author, "Cal Newport");
        assert_eq!(tail, "");
    }

    #[test]
    fn test_segment_already_linked() {
        let seg = RelatedSegment::new("[[Books-2026-01-02|1兆ドルコーチ]]（ビル・キャンベル）");
        assert!(seg.linked);
    }

    #[test]
    fn test_segment_without_parens_unparseable() {
        let seg = RelatedSegment::new("ただのテキスト");
        assert!(seg.parsed.is_none());
    }

    #[test]
    fn test_untouched_note_is_byte_stable() {
        let note = sample_note();
        assert_eq!(note.content(), SAMPLE);
    }
}
