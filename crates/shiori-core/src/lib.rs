//! # shiori-core
//!
//! Core types and text utilities for the shiori library.
//!
//! This crate provides the normalization and fuzzy-matching primitives
//! that the extraction and vault crates build on.

pub mod error;
pub mod logging;
pub mod matcher;
pub mod normalize;

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use matcher::{author_matches, similarity, title_matches};
pub use normalize::{
    clean_display_title, nfkc, normalize_author, normalize_key, normalize_title, strip_subtitle,
};
