//! Structured logging field name constants for shiori.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Recoverable issue, note skipped or fallback applied |
//! | INFO  | Run lifecycle, per-run totals |
//! | DEBUG | Tier decisions, match decisions |
//! | TRACE | Per-segment and per-key iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "extract", "vault", "core"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "field_extractor", "linker", "matcher"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "extract", "load", "resolve", "write"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Path of the note file being operated on.
pub const NOTE_PATH: &str = "note_path";

/// Field name being extracted.
pub const FIELD: &str = "field";

/// Extraction tier that produced a value.
pub const TIER: &str = "tier";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of notes loaded in a run.
pub const NOTE_COUNT: &str = "note_count";

/// Number of related-book segments linked in a run.
pub const SEGMENTS_LINKED: &str = "segments_linked";

/// Number of files written back in a run.
pub const FILES_WRITTEN: &str = "files_written";

/// Byte length of the payload handed to the extractor.
pub const PAYLOAD_LEN: &str = "payload_len";

/// Wall-clock duration of an operation in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
