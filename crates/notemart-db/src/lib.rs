//! # notemart-db
//!
//! PostgreSQL note store for notemart.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgNoteRepository`], the local source of the search aggregator
//! - Schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use notemart_db::{CreateNoteRequest, Database, LocalNoteQuery, LocalNoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notemart").await?;
//!
//!     db.notes.insert(CreateNoteRequest {
//!         user_id: "u1".to_string(),
//!         title: "Linear Algebra".to_string(),
//!         pdf_url: "/uploads/la.pdf".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     let found = db.notes.find_notes(&LocalNoteQuery::keyword("algebra", 10)).await?;
//!     println!("Found {} notes", found.len());
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;

// Test fixtures for integration tests
pub mod test_fixtures;

// Re-export core types
pub use notemart_core::*;

pub use notes::{CreateNoteRequest, PgNoteRepository};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Database context holding the pool and the note repository.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like(r"C:\notes"), r"C:\\notes");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_escape_like_backslash_first() {
        assert_eq!(escape_like(r"\%"), r"\\\%");
    }
}
