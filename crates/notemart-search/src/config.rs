//! Aggregator configuration.
//!
//! Values come from the constructor, never from module state, so tests and
//! differently configured aggregators can coexist. [`AggregatorConfig::from_env`]
//! reads `NOTEMART_*` variables over the defaults in
//! [`notemart_core::defaults`].

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use notemart_core::defaults;
use notemart_core::ExternalSort;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables of the note search aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    /// Limit used when the caller gives none.
    pub default_limit: i64,
    /// Caller limits above this are clamped.
    pub max_limit: i64,
    /// Most records requested from the external repository per search.
    pub external_cap: i64,
    /// Largest page size the external repository accepts.
    pub external_page_cap: i64,
    /// Default number of suggestions.
    pub suggest_limit: i64,
    /// Snippet budget in characters.
    pub snippet_chars: usize,
    /// Default size of the popular listing.
    pub popular_limit: i64,
    /// Deadline applied to each source independently.
    pub source_timeout: Duration,
    /// Preferred attachment format for external records.
    pub document_format: String,
    /// Sort requested from the external repository during search.
    pub external_sort: Option<ExternalSort>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::SEARCH_LIMIT,
            max_limit: defaults::MAX_SEARCH_LIMIT,
            external_cap: defaults::EXTERNAL_CAP,
            external_page_cap: defaults::EXTERNAL_PAGE_CAP,
            suggest_limit: defaults::SUGGEST_LIMIT,
            snippet_chars: defaults::SNIPPET_CHARS,
            popular_limit: defaults::POPULAR_LIMIT,
            source_timeout: Duration::from_secs(defaults::SOURCE_TIMEOUT_SECS),
            document_format: defaults::DOCUMENT_FORMAT.to_string(),
            external_sort: None,
        }
    }
}

impl AggregatorConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Reads `NOTEMART_SEARCH_LIMIT`, `NOTEMART_SEARCH_MAX_LIMIT`,
    /// `NOTEMART_EXTERNAL_CAP`, `NOTEMART_EXTERNAL_PAGE_CAP`, `NOTEMART_SUGGEST_LIMIT`,
    /// `NOTEMART_SNIPPET_CHARS`, `NOTEMART_POPULAR_LIMIT`,
    /// `NOTEMART_SOURCE_TIMEOUT_SECS`, `NOTEMART_DOCUMENT_FORMAT` and
    /// `NOTEMART_EXTERNAL_SORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<i64>().ok());

        let config = Self {
            default_limit: parsed("NOTEMART_SEARCH_LIMIT").unwrap_or(base.default_limit),
            max_limit: parsed("NOTEMART_SEARCH_MAX_LIMIT").unwrap_or(base.max_limit),
            external_cap: parsed("NOTEMART_EXTERNAL_CAP").unwrap_or(base.external_cap),
            external_page_cap: parsed("NOTEMART_EXTERNAL_PAGE_CAP")
                .unwrap_or(base.external_page_cap),
            suggest_limit: parsed("NOTEMART_SUGGEST_LIMIT").unwrap_or(base.suggest_limit),
            snippet_chars: lookup("NOTEMART_SNIPPET_CHARS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(base.snippet_chars),
            popular_limit: parsed("NOTEMART_POPULAR_LIMIT").unwrap_or(base.popular_limit),
            source_timeout: lookup("NOTEMART_SOURCE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.source_timeout),
            document_format: lookup("NOTEMART_DOCUMENT_FORMAT")
                .map(|v| v.trim().trim_start_matches('.').to_lowercase())
                .unwrap_or(base.document_format),
            external_sort: lookup("NOTEMART_EXTERNAL_SORT").and_then(|v| v.parse().ok()),
        };

        debug!(
            default_limit = config.default_limit,
            external_cap = config.external_cap,
            source_timeout_ms = config.source_timeout.as_millis() as u64,
            "Loaded aggregator configuration"
        );
        config
    }

    /// Set the per-source timeout.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Set the external request cap.
    pub fn with_external_cap(mut self, cap: i64) -> Self {
        self.external_cap = cap;
        self
    }

    /// Set the external page size ceiling.
    pub fn with_external_page_cap(mut self, cap: i64) -> Self {
        self.external_page_cap = cap;
        self
    }

    /// Set the default search limit.
    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the sort requested from the external repository.
    pub fn with_external_sort(mut self, sort: ExternalSort) -> Self {
        self.external_sort = Some(sort);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("default_limit", self.default_limit),
            ("max_limit", self.max_limit),
            ("external_cap", self.external_cap),
            ("external_page_cap", self.external_page_cap),
            ("suggest_limit", self.suggest_limit),
            ("popular_limit", self.popular_limit),
        ];
        for (name, value) in positive {
            if value < 1 {
                return Err(ConfigError::Validation(format!(
                    "{} must be >= 1, got {}",
                    name, value
                )));
            }
        }

        if self.default_limit > self.max_limit {
            return Err(ConfigError::Validation(format!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }

        if self.snippet_chars == 0 {
            return Err(ConfigError::Validation(
                "snippet_chars must be >= 1".to_string(),
            ));
        }

        if self.source_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "source_timeout must be non-zero".to_string(),
            ));
        }

        if self.document_format.is_empty() {
            return Err(ConfigError::Validation(
                "document_format cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
