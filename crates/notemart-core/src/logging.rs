//! Structured logging schema and field name constants for notemart.
//!
//! `tracing` macros take literal field names, so the `#[instrument]` and
//! event calls across crates spell these out by hand. The constants record
//! the canonical names; the aggregator's tests check its events against them.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (a source failed) |
//! | INFO  | Lifecycle events (startup, shutdown), search completions |
//! | DEBUG | Decision points, caps, config choices |
//! | TRACE | Per-record iteration (normalization, dedup drops) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "database", "zenodo"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "aggregator", "notes", "client", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "suggest", "popular", "browse", "find_notes", "search_records"
pub const OPERATION: &str = "op";

// ─── Request fields ────────────────────────────────────────────────────────

/// Free-text search query.
pub const QUERY: &str = "query";

/// Effective result limit.
pub const LIMIT: &str = "limit";

/// Which source a branch event refers to ("local", "external").
pub const SOURCE: &str = "source";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned.
pub const RESULT_COUNT: &str = "result_count";

/// Records returned by the local store before merge.
pub const LOCAL_HITS: &str = "local_hits";

/// Records returned by the external repository before merge.
pub const EXTERNAL_HITS: &str = "external_hits";

/// Entries dropped by key deduplication.
pub const DUPLICATES: &str = "duplicates";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// HTTP status returned by a remote source.
pub const STATUS: &str = "status";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
