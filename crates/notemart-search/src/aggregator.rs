//! Multi-source note search.
//!
//! A search fans out to the local note store and the external record
//! repository concurrently, absorbs a failure of either branch, normalizes
//! everything into [`NormalizedNote`], and merges local-first with key
//! deduplication.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use notemart_core::{
    Error, ExternalQuery, ExternalRecordRepository, LocalNoteQuery, LocalNoteStore,
    NormalizedNote, NoteSource, Result, Suggestion,
};

use crate::config::AggregatorConfig;
use crate::dedup::{deduplicate_notes, merge_results};
use crate::normalize::{normalize_external, normalize_local};

/// Branch duration above which a warning is logged.
const SLOW_SOURCE_MS: u64 = 2_000;

/// What happened to one source during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceOutcome {
    /// The source was not contacted.
    Skipped,
    /// The source answered with `count` records.
    Succeeded { count: usize },
    /// The source failed or timed out and contributed nothing.
    Failed {
        #[serde(skip_serializing)]
        reason: String,
    },
}

impl SourceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

/// Search results together with per-source outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub notes: Vec<NormalizedNote>,
    pub local: SourceOutcome,
    pub external: SourceOutcome,
    /// Entries dropped by key deduplication.
    pub duplicates: usize,
}

impl SearchReport {
    fn skipped() -> Self {
        Self {
            notes: Vec::new(),
            local: SourceOutcome::Skipped,
            external: SourceOutcome::Skipped,
            duplicates: 0,
        }
    }

    /// True when every contacted source failed.
    pub fn all_sources_failed(&self) -> bool {
        self.local.is_failed() && self.external.is_failed()
    }
}

/// Aggregates the local note store and the external record repository.
#[derive(Clone)]
pub struct NoteSearchAggregator {
    local: Arc<dyn LocalNoteStore>,
    external: Arc<dyn ExternalRecordRepository>,
    config: AggregatorConfig,
}

impl NoteSearchAggregator {
    pub fn new(
        local: Arc<dyn LocalNoteStore>,
        external: Arc<dyn ExternalRecordRepository>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            local,
            external,
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Search both sources and return the merged, deduplicated notes.
    ///
    /// Source failures are absorbed; the only error is an invalid `limit`.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<NormalizedNote>> {
        self.search_with_report(query, limit)
            .await
            .map(|report| report.notes)
    }

    /// Like [`search`](Self::search), also reporting what each source did.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "aggregator",
        op = "search",
        query = %query,
    ))]
    pub async fn search_with_report(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<SearchReport> {
        let limit = self.resolve_limit(limit, self.config.default_limit)?;
        let query = query.trim();
        if query.is_empty() {
            debug!("Empty query, no source contacted");
            return Ok(SearchReport::skipped());
        }

        let start = Instant::now();
        let local_query = LocalNoteQuery::keyword(query, limit);
        let external_query = ExternalQuery::text(query, self.external_size(limit))
            .with_sort(self.config.external_sort);

        let (local, external) = futures::future::join(
            self.settle(NoteSource::Local, self.local.find_notes(&local_query)),
            self.settle(
                NoteSource::External,
                self.external.search_records(&external_query),
            ),
        )
        .await;

        let (local_records, local_outcome) = absorb(NoteSource::Local, local);
        let (external_records, external_outcome) = absorb(NoteSource::External, external);

        let local_notes: Vec<NormalizedNote> =
            local_records.into_iter().map(normalize_local).collect();
        let external_notes: Vec<NormalizedNote> = external_records
            .into_iter()
            .map(|record| normalize_external(record, &self.config.document_format))
            .collect();
        let local_hits = local_notes.len();
        let external_hits = external_notes.len();

        let (notes, duplicates) = merge_results(local_notes, external_notes, limit as usize);

        info!(
            local_hits,
            external_hits,
            duplicates,
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Note search completed"
        );

        Ok(SearchReport {
            notes,
            local: local_outcome,
            external: external_outcome,
            duplicates,
        })
    }

    /// Type-ahead suggestions. Never fails; problems are logged and yield an
    /// empty list.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "aggregator",
        op = "suggest",
        query = %query,
    ))]
    pub async fn suggest(&self, query: &str, limit: Option<i64>) -> Vec<Suggestion> {
        let limit = limit.unwrap_or(self.config.suggest_limit);
        match self.search(query, Some(limit)).await {
            Ok(notes) => notes
                .iter()
                .map(|note| Suggestion::from_note(note, self.config.snippet_chars))
                .collect(),
            Err(e) => {
                error!(error = %e, "Suggestion lookup failed");
                Vec::new()
            }
        }
    }

    /// Most viewed records of the external repository.
    ///
    /// A failing repository yields an empty list.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "aggregator",
        op = "popular",
    ))]
    pub async fn popular(&self, limit: Option<i64>) -> Result<Vec<NormalizedNote>> {
        let limit = self.resolve_limit(limit, self.config.popular_limit)?;
        let start = Instant::now();

        let result = self
            .settle(
                NoteSource::External,
                self.external
                    .search_records(&ExternalQuery::most_viewed(self.external_page(limit))),
            )
            .await;
        let (records, _) = absorb(NoteSource::External, result);

        let notes: Vec<NormalizedNote> = records
            .into_iter()
            .map(|record| normalize_external(record, &self.config.document_format))
            .collect();
        let (mut notes, _) = deduplicate_notes(notes);
        notes.truncate(limit as usize);

        debug!(
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Popular listing completed"
        );
        Ok(notes)
    }

    /// Newest-first listing of the local store with optional exact filters.
    ///
    /// Unlike [`search`](Self::search) this reads a single source, so its
    /// failure is returned to the caller.
    #[instrument(skip(self, query), fields(
        subsystem = "search",
        component = "aggregator",
        op = "browse",
    ))]
    pub async fn browse(&self, query: LocalNoteQuery) -> Result<Vec<NormalizedNote>> {
        let limit = self.resolve_limit(query.limit, self.config.default_limit)?;
        let query = LocalNoteQuery {
            keyword: trimmed(query.keyword),
            user_id: trimmed(query.user_id),
            category: trimmed(query.category),
            language: trimmed(query.language),
            limit: Some(limit),
        };
        let start = Instant::now();

        let records = self
            .settle(NoteSource::Local, self.local.find_notes(&query))
            .await?;
        let notes: Vec<NormalizedNote> = records.into_iter().map(normalize_local).collect();

        debug!(
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Local listing completed"
        );
        Ok(notes)
    }

    /// Records requested from the external repository for a search.
    fn external_size(&self, limit: i64) -> i64 {
        self.external_page(self.config.external_cap.min(limit))
    }

    /// Clamp a request to the page size the external repository serves.
    fn external_page(&self, size: i64) -> i64 {
        size.min(self.config.external_page_cap)
    }

    /// Apply the default, reject non-positive values, clamp to `max_limit`.
    fn resolve_limit(&self, limit: Option<i64>, default: i64) -> Result<i64> {
        let limit = limit.unwrap_or(default);
        if limit <= 0 {
            return Err(Error::InvalidArgument(format!(
                "limit must be positive, got {}",
                limit
            )));
        }
        Ok(limit.min(self.config.max_limit))
    }

    /// Run one branch under the source deadline, turning a timeout or a panic
    /// into `SourceUnavailable`.
    async fn settle<T, F>(&self, origin: NoteSource, branch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let timeout = self.config.source_timeout;
        let guarded = AssertUnwindSafe(branch).catch_unwind();

        let result = match tokio::time::timeout(timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::SourceUnavailable {
                origin,
                reason: "source panicked".to_string(),
            }),
            Err(_) => Err(Error::SourceUnavailable {
                origin,
                reason: format!("timed out after {}ms", timeout.as_millis()),
            }),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        if duration_ms > SLOW_SOURCE_MS {
            warn!(source = %origin, duration_ms, slow = true, "Slow source");
        } else {
            debug!(source = %origin, duration_ms, "Source settled");
        }
        result
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert a settled branch into its records and outcome, logging failures.
fn absorb<R>(origin: NoteSource, result: Result<Vec<R>>) -> (Vec<R>, SourceOutcome) {
    match result {
        Ok(records) => {
            let count = records.len();
            (records, SourceOutcome::Succeeded { count })
        }
        Err(e) => {
            warn!(source = %origin, error = %e, "Source unavailable, continuing without it");
            (
                Vec::new(),
                SourceOutcome::Failed {
                    reason: e.to_string(),
                },
            )
        }
    }
}
