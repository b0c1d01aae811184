//! # shiori-extract
//!
//! Resilient extraction of named fields from semi-structured model output.
//!
//! Model responses arrive as valid JSON, JSON buried in prose, or free-form
//! prose with labeled sections. The extractor degrades through four
//! precision tiers and never fails: a field that cannot be recovered is the
//! empty string, tagged with [`Provenance::Empty`].

pub mod actions;
pub mod extract;
pub mod prose;
pub mod repair;
pub mod spec;

pub use actions::extract_actions;
pub use extract::{extract, ExtractedRecord, ExtractionPayload};
pub use spec::{default_field_specs, FieldSpec, Provenance};
