//! # notemart-search
//!
//! Multi-source note search for notemart.
//!
//! This crate provides:
//! - Concurrent fan-out to the local note store and the external repository
//! - Normalization of both record shapes into [`NormalizedNote`]
//! - Local-first merge with derived-key deduplication
//! - Type-ahead suggestions and the popular listing
//!
//! Failure of a single source never fails a search; the surviving source's
//! results are returned and the failure is logged.
//!
//! [`NormalizedNote`]: notemart_core::NormalizedNote

pub mod aggregator;
pub mod config;
pub mod dedup;
pub mod normalize;

// Re-export main types
pub use aggregator::{NoteSearchAggregator, SearchReport, SourceOutcome};
pub use config::{AggregatorConfig, ConfigError, ConfigResult};
pub use dedup::{deduplicate_notes, merge_results};
pub use normalize::{derive_key, normalize_external, normalize_local, resolve_price};

// Re-export core types for convenience
pub use notemart_core::{Error, NormalizedNote, NoteSource, Result, Suggestion};
