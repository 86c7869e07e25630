//! # notemart-zenodo
//!
//! Adapter exposing the Zenodo records API as an
//! [`ExternalRecordRepository`](notemart_core::ExternalRecordRepository).
//!
//! Every failure (transport, non-success status, undecodable body) surfaces as
//! [`Error::SourceUnavailable`](notemart_core::Error::SourceUnavailable) for the
//! external source.

pub mod client;
pub mod config;

pub use client::ZenodoClient;
pub use config::{ConfigError, ConfigResult, ZenodoConfig};
