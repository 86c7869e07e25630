//! # notemart-core
//!
//! Core types, source contracts, and errors for the notemart note marketplace.
//!
//! This crate provides the normalized note shape shared by every search
//! surface, the raw record shapes produced by the local and external sources,
//! and the traits those sources implement.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
