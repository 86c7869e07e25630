//! Zenodo client configuration.

use std::fmt;

use thiserror::Error;

use notemart_core::defaults;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Connection settings for the Zenodo records API.
#[derive(Clone, PartialEq)]
pub struct ZenodoConfig {
    /// Records search endpoint.
    pub base_url: String,
    /// Personal access token, sent as the `access_token` query parameter.
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

// The token stays out of logs.
impl fmt::Debug for ZenodoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZenodoConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for ZenodoConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::ZENODO_URL.to_string(),
            access_token: None,
            timeout_seconds: defaults::SOURCE_TIMEOUT_SECS,
        }
    }
}

impl ZenodoConfig {
    /// Load from `ZENODO_BASE`, `ZENODO_ACCESS_TOKEN` and `ZENODO_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        Self {
            base_url: lookup("ZENODO_BASE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(base.base_url),
            access_token: lookup("ZENODO_ACCESS_TOKEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            timeout_seconds: lookup("ZENODO_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(base.timeout_seconds),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "timeout_seconds must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_public_api() {
        let config = ZenodoConfig::default();
        assert_eq!(config.base_url, "https://zenodo.org/api/records");
        assert!(config.access_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = ZenodoConfig::from_lookup(|key| match key {
            "ZENODO_BASE" => Some("http://localhost:9000/api/records".to_string()),
            "ZENODO_ACCESS_TOKEN" => Some("  secret  ".to_string()),
            "ZENODO_TIMEOUT_SECS" => Some("3".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://localhost:9000/api/records");
        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_seconds, 3);
    }

    #[test]
    fn test_blank_token_is_absent() {
        let config = ZenodoConfig::from_lookup(|key| {
            (key == "ZENODO_ACCESS_TOKEN").then(|| "   ".to_string())
        });
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ZenodoConfig::default().with_access_token("hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ZenodoConfig::default().with_base_url("zenodo.org");
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl("zenodo.org".to_string()))
        );
    }
}
