//! Centralized default constants for notemart.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers; runtime overrides go through each crate's config struct.

// =============================================================================
// SEARCH
// =============================================================================

/// Default number of merged results returned by a search.
pub const SEARCH_LIMIT: i64 = 50;

/// Upper bound applied to caller-supplied search limits.
pub const MAX_SEARCH_LIMIT: i64 = 200;

/// Maximum records requested from the external repository per search.
pub const EXTERNAL_CAP: i64 = 12;

/// Largest page the external repository serves to anonymous clients.
pub const EXTERNAL_PAGE_CAP: i64 = 25;

/// Default number of suggestions for type-ahead.
pub const SUGGEST_LIMIT: i64 = 8;

/// Character budget for suggestion snippets.
pub const SNIPPET_CHARS: usize = 120;

/// Default size of the popular-notes listing.
pub const POPULAR_LIMIT: i64 = 10;

/// Per-source timeout in seconds.
pub const SOURCE_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Preferred attachment format when picking an external record's file.
pub const DOCUMENT_FORMAT: &str = "pdf";

/// Title used when a record has none.
pub const UNTITLED: &str = "Untitled";

/// Language assumed for local notes that omit one.
pub const LOCAL_LANGUAGE: &str = "English";

/// Language reported for external records that omit one.
pub const EXTERNAL_LANGUAGE: &str = "Unknown";

/// Owner sentinel for external records without an owner.
pub const EXTERNAL_OWNER: &str = "zenodo";

// =============================================================================
// EXTERNAL REPOSITORY
// =============================================================================

/// Zenodo records API endpoint.
pub const ZENODO_URL: &str = "https://zenodo.org/api/records";

// =============================================================================
// DATABASE
// =============================================================================

/// Default local database URL.
pub const DATABASE_URL: &str = "postgres://localhost/notemart";

/// Default maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default pool acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 5000;

/// Default CORS origin (local frontend dev server).
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;
