//! Source contracts consumed by the search aggregator.
//!
//! Each source is a query-by-keyword interface. Implementations report any
//! failure as an error; absorbing it is the aggregator's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ExternalRecord, LocalNoteRecord};

// =============================================================================
// LOCAL NOTE STORE
// =============================================================================

/// Query against the local note store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalNoteQuery {
    /// Case-insensitive substring matched against title or description
    pub keyword: Option<String>,
    /// Filter by owning user
    pub user_id: Option<String>,
    /// Filter by category
    pub category: Option<String>,
    /// Filter by language
    pub language: Option<String>,
    /// Maximum records
    pub limit: Option<i64>,
}

impl LocalNoteQuery {
    /// Keyword query capped at `limit` records.
    pub fn keyword(keyword: impl Into<String>, limit: i64) -> Self {
        Self {
            keyword: Some(keyword.into()),
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Store of user-submitted notes.
#[async_trait]
pub trait LocalNoteStore: Send + Sync {
    /// Find notes matching the query, newest first.
    async fn find_notes(&self, query: &LocalNoteQuery) -> Result<Vec<LocalNoteRecord>>;
}

// =============================================================================
// EXTERNAL RECORD REPOSITORY
// =============================================================================

/// Sort order offered by the external repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalSort {
    BestMatch,
    MostRecent,
    MostViewed,
}

impl ExternalSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalSort::BestMatch => "bestmatch",
            ExternalSort::MostRecent => "mostrecent",
            ExternalSort::MostViewed => "mostviewed",
        }
    }
}

impl std::str::FromStr for ExternalSort {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bestmatch" | "relevance" => Ok(Self::BestMatch),
            "mostrecent" | "recent" => Ok(Self::MostRecent),
            "mostviewed" | "popular" => Ok(Self::MostViewed),
            other => Err(crate::error::Error::Config(format!(
                "unknown external sort: {}",
                other
            ))),
        }
    }
}

/// Query against the external record repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalQuery {
    /// Free text; `None` lists records in `sort` order.
    pub text: Option<String>,
    /// Maximum records
    pub size: i64,
    pub sort: Option<ExternalSort>,
}

impl ExternalQuery {
    /// Free-text query capped at `size` records.
    pub fn text(text: impl Into<String>, size: i64) -> Self {
        Self {
            text: Some(text.into()),
            size,
            sort: None,
        }
    }

    /// Listing of the most viewed records.
    pub fn most_viewed(size: i64) -> Self {
        Self {
            text: None,
            size,
            sort: Some(ExternalSort::MostViewed),
        }
    }

    pub fn with_sort(mut self, sort: Option<ExternalSort>) -> Self {
        self.sort = sort;
        self
    }
}

/// Third-party catalog of public records.
#[async_trait]
pub trait ExternalRecordRepository: Send + Sync {
    /// Search the catalog.
    async fn search_records(&self, query: &ExternalQuery) -> Result<Vec<ExternalRecord>>;
}
