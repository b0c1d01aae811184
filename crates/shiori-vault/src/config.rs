//! Vault configuration.
//!
//! Components never read ambient global state; callers build a config
//! once (a binary may read environment variables for that) and pass it in.

use std::path::PathBuf;

/// Default filename prefix for book notes.
pub const DEFAULT_NOTE_PREFIX: &str = "Books-";

/// Where the corpus lives and which files belong to it.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Directory containing the note files.
    pub root: PathBuf,
    /// Filename prefix selecting book notes (`<prefix>*.md`).
    pub prefix: String,
}

impl VaultConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: DEFAULT_NOTE_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}
