//! # shiori-vault
//!
//! In-memory model of a note corpus and the cross-note linker.
//!
//! The linker runs as a batch state machine, Load → Resolve → Write: the
//! whole corpus is loaded before any mutation, related-book mentions are
//! resolved against every other note with fuzzy title/author matching,
//! and only changed notes are written back. Repeated runs are idempotent.

pub mod config;
pub mod linker;
pub mod note;

pub use config::VaultConfig;
pub use linker::{link_all, LinkReport, Vault};
pub use note::{Note, RelatedSegment};
