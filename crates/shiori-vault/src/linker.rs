//! Cross-note linker: Load → Resolve → Write.
//!
//! The whole corpus is loaded up front, every unlinked `Title（Author）`
//! segment in each note's related-books section is resolved against the
//! other notes, and only changed notes are written back. Resolve itself
//! is two-phase: a read-only scan collects edit operations against the
//! pristine corpus, then all operations are applied. Matching therefore
//! never observes partially rewritten notes, and link resolution does not
//! depend on file iteration order.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use shiori_core::{
    author_matches, clean_display_title, normalize_author, normalize_title, similarity,
    title_matches, Result,
};

use crate::config::VaultConfig;
use crate::note::{join_segments, split_segments, Note, RelatedSegment};

/// Outcome of one linker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Related-book segments rewritten into links.
    pub segments_linked: usize,
    /// Notes whose content changed on disk.
    pub files_written: usize,
}

/// Replace one bullet line with its relinked form. Rewrites never change
/// line counts, so the collected indices stay valid across application.
#[derive(Debug)]
struct RewriteOp {
    note_idx: usize,
    line_idx: usize,
    new_line: String,
}

/// Insert a back-link bullet into the target note's related-books section.
#[derive(Debug)]
struct ReciprocalOp {
    target_idx: usize,
    source_idx: usize,
    /// Display title/author used when the source note has none of its own.
    fallback_title: String,
    fallback_author: String,
}

/// The loaded corpus.
pub struct Vault {
    pub config: VaultConfig,
    pub notes: Vec<Note>,
}

impl Vault {
    /// Load every `<prefix>*.md` under the vault root, sorted by filename.
    /// Unreadable entries are logged and skipped; the batch continues.
    pub fn load(config: VaultConfig) -> Result<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&config.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&config.prefix) && name.ends_with(".md") && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut notes = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => notes.push(Note::parse(path, &content)),
                Err(err) => {
                    warn!(note_path = %path.display(), error = %err, "skipping unreadable note");
                }
            }
        }
        info!(note_count = notes.len(), "vault loaded");
        Ok(Self { config, notes })
    }

    /// Resolve related-book mentions into `[[stem|Title]]` links and queue
    /// reciprocal back-links. Returns the number of segments linked.
    pub fn resolve(&mut self) -> usize {
        let (rewrites, reciprocals, matched) = self.collect_ops();
        self.apply_ops(rewrites, reciprocals);
        matched
    }

    /// Phase one: scan the pristine corpus and collect every edit.
    fn collect_ops(&self) -> (Vec<RewriteOp>, Vec<ReciprocalOp>, usize) {
        let mut rewrites = Vec::new();
        let mut reciprocals: Vec<ReciprocalOp> = Vec::new();
        let mut queued: HashSet<(usize, usize)> = HashSet::new();
        let mut matched = 0usize;

        for (ni, note) in self.notes.iter().enumerate() {
            let Some((start, end)) = note.related_section() else {
                continue;
            };
            for li in start + 1..end {
                let line = &note.lines[li];
                if !line.trim_start().starts_with(['-', '*']) {
                    continue;
                }
                let mut segs = split_segments(line);
                let mut changed = false;
                for seg in segs.iter_mut() {
                    let parsed = RelatedSegment::new(seg);
                    if parsed.linked {
                        continue;
                    }
                    let Some((title, author, tail)) = parsed.parsed else {
                        continue;
                    };
                    let Some(best) = self.best_match(ni, &title, &author) else {
                        continue;
                    };
                    let target = &self.notes[best];
                    debug!(
                        note_path = %note.path.display(),
                        title = %title,
                        target = %target.stem,
                        "segment linked"
                    );
                    *seg = format!("[[{}|{}]]（{}）{}", target.stem, title, author, tail);
                    changed = true;
                    matched += 1;
                    if queued.insert((best, ni)) {
                        reciprocals.push(ReciprocalOp {
                            target_idx: best,
                            source_idx: ni,
                            fallback_title: title,
                            fallback_author: author,
                        });
                    }
                }
                if changed {
                    rewrites.push(RewriteOp {
                        note_idx: ni,
                        line_idx: li,
                        new_line: join_segments(&segs),
                    });
                }
            }
        }
        (rewrites, reciprocals, matched)
    }

    /// Best candidate for a mention: the author must match, and among
    /// title-matching candidates the one with the strictly highest title
    /// similarity wins.
    fn best_match(&self, source_idx: usize, title: &str, author: &str) -> Option<usize> {
        let author_key = normalize_author(author);
        let title_key = normalize_title(title);
        let mut best: Option<usize> = None;
        let mut best_score = 0.0f32;
        for (ci, cand) in self.notes.iter().enumerate() {
            if ci == source_idx {
                continue;
            }
            let Some(cand_author) = cand.author_norm.as_deref() else {
                continue;
            };
            if !author_matches(&author_key, cand_author) {
                continue;
            }
            let Some(cand_title) = cand.title_norm.as_deref() else {
                continue;
            };
            if !title_matches(&title_key, cand_title) {
                continue;
            }
            let score = similarity(&title_key, cand_title);
            if score > best_score {
                best = Some(ci);
                best_score = score;
            }
        }
        best
    }

    /// Phase two: apply rewrites first (indices collected against the
    /// pristine corpus stay valid), then insert reciprocal bullets.
    fn apply_ops(&mut self, rewrites: Vec<RewriteOp>, reciprocals: Vec<ReciprocalOp>) {
        for op in rewrites {
            let note = &mut self.notes[op.note_idx];
            note.lines[op.line_idx] = op.new_line;
            note.dirty = true;
        }
        for op in reciprocals {
            let source_stem = self.notes[op.source_idx].stem.clone();
            let display_title = self.notes[op.source_idx]
                .title
                .as_deref()
                .map(clean_display_title)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| op.fallback_title.clone());
            let display_author = self.notes[op.source_idx]
                .author
                .clone()
                .unwrap_or_else(|| op.fallback_author.clone());

            let target = &mut self.notes[op.target_idx];
            let (start, end) = target.ensure_related_section();
            let block: String = target.lines[start..end].concat();
            if block.contains(&format!("[[{source_stem}|")) {
                continue;
            }
            target.lines.insert(
                end,
                format!("- [[{source_stem}|{display_title}]]（{display_author}）\n"),
            );
            target.dirty = true;
        }
    }

    /// Write every dirty note back to disk, atomically per file. A note
    /// that fails to write is logged and skipped; the rest of the batch
    /// still lands. Returns the number of files written.
    pub fn write(&mut self) -> Result<usize> {
        let root = self.config.root.clone();
        let mut written = 0usize;
        for note in &mut self.notes {
            if !note.dirty {
                continue;
            }
            match persist_note(&root, note) {
                Ok(()) => {
                    note.dirty = false;
                    written += 1;
                    debug!(note_path = %note.path.display(), "note written");
                }
                Err(err) => {
                    warn!(note_path = %note.path.display(), error = %err, "skipping unwritable note");
                }
            }
        }
        info!(files_written = written, "vault write complete");
        Ok(written)
    }
}

fn persist_note(root: &Path, note: &Note) -> Result<()> {
    let parent = note.path.parent().unwrap_or(root);
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(note.content().as_bytes())?;
    tmp.persist(&note.path).map_err(|e| e.error)?;
    Ok(())
}

/// One full linker pass over the vault.
pub fn link_all(config: VaultConfig) -> Result<LinkReport> {
    let mut vault = Vault::load(config)?;
    let segments_linked = vault.resolve();
    let files_written = vault.write()?;
    info!(segments_linked, files_written, "link pass complete");
    Ok(LinkReport {
        segments_linked,
        files_written,
    })
}
