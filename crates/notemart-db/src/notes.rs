//! Note repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use notemart_core::{Error, LocalNoteQuery, LocalNoteRecord, LocalNoteStore, Result};

use crate::escape_like;

const NOTE_COLUMNS: &str = "id, user_id, title, description, language, category, pdf_url, \
                            is_free, price, likes, created_at";

/// Request for inserting a note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `English`.
    pub language: Option<String>,
    /// Defaults to `General`.
    pub category: Option<String>,
    pub pdf_url: String,
    /// Defaults to free.
    pub is_free: Option<bool>,
    pub price: Option<f64>,
}

/// PostgreSQL implementation of [`LocalNoteStore`].
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a note and return its id.
    pub async fn insert(&self, req: CreateNoteRequest) -> Result<Uuid> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }
        if req.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(Error::InvalidArgument(
                "price must be a non-negative number".to_string(),
            ));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO note (id, user_id, title, description, language, category, pdf_url,
                              is_free, price, likes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'English'), COALESCE($6, 'General'), $7,
                    COALESCE($8, TRUE), COALESCE($9, 0), 0, $10, $10)
            "#,
        )
        .bind(id)
        .bind(&req.user_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.language)
        .bind(&req.category)
        .bind(&req.pdf_url)
        .bind(req.is_free)
        .bind(req.price)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(note_id = %id, "Inserted note");
        Ok(id)
    }
}

// =============================================================================
// QUERY BUILDING
// =============================================================================

/// SQL and text binds for a note lookup. The limit, when present, is the
/// final bind.
#[derive(Debug, PartialEq)]
struct FindQuery {
    sql: String,
    binds: Vec<String>,
    limit: Option<i64>,
}

fn build_find_query(query: &LocalNoteQuery) -> FindQuery {
    let mut sql = format!("SELECT {} FROM note WHERE TRUE", NOTE_COLUMNS);
    let mut binds = Vec::new();

    if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        binds.push(escape_like(keyword));
        let idx = binds.len();
        sql.push_str(&format!(
            " AND (title ILIKE '%' || ${idx} || '%' ESCAPE '\\' \
             OR description ILIKE '%' || ${idx} || '%' ESCAPE '\\')"
        ));
    }

    let exact = [
        ("user_id", &query.user_id),
        ("category", &query.category),
        ("language", &query.language),
    ];
    for (column, value) in exact {
        if let Some(value) = value.as_deref() {
            binds.push(value.to_string());
            sql.push_str(&format!(" AND {} = ${}", column, binds.len()));
        }
    }

    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let limit = query.limit.filter(|l| *l > 0);
    if limit.is_some() {
        sql.push_str(&format!(" LIMIT ${}", binds.len() + 1));
    }

    FindQuery { sql, binds, limit }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> LocalNoteRecord {
    let id: Uuid = row.get("id");
    let created_at: DateTime<Utc> = row.get("created_at");
    LocalNoteRecord {
        id: Some(id.to_string()),
        title: Some(row.get("title")),
        description: row.get("description"),
        created_at: Some(created_at),
        language: Some(row.get("language")),
        category: Some(row.get("category")),
        file_url: Some(row.get("pdf_url")),
        owner_id: Some(row.get("user_id")),
        price: Some(row.get("price")),
        is_free: Some(row.get("is_free")),
        like_count: Some(row.get("likes")),
    }
}

#[async_trait]
impl LocalNoteStore for PgNoteRepository {
    #[instrument(skip(self, query), fields(
        subsystem = "database",
        component = "notes",
        op = "find_notes",
    ))]
    async fn find_notes(&self, query: &LocalNoteQuery) -> Result<Vec<LocalNoteRecord>> {
        let start = Instant::now();
        let find = build_find_query(query);

        let mut q = sqlx::query(&find.sql);
        for bind in &find.binds {
            q = q.bind(bind);
        }
        if let Some(limit) = find.limit {
            q = q.bind(limit);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;
        let records: Vec<LocalNoteRecord> = rows.iter().map(row_to_record).collect();

        debug!(
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Local note lookup complete"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_matches_title_or_description() {
        let find = build_find_query(&LocalNoteQuery::keyword("algebra", 50));
        assert!(find
            .sql
            .contains("title ILIKE '%' || $1 || '%' ESCAPE '\\'"));
        assert!(find
            .sql
            .contains("OR description ILIKE '%' || $1 || '%' ESCAPE '\\'"));
        assert!(find.sql.ends_with("ORDER BY created_at DESC, id DESC LIMIT $2"));
        assert_eq!(find.binds, vec!["algebra".to_string()]);
        assert_eq!(find.limit, Some(50));
    }

    #[test]
    fn test_keyword_wildcards_are_escaped() {
        let find = build_find_query(&LocalNoteQuery::keyword("100%_done", 5));
        assert_eq!(find.binds, vec!["100\\%\\_done".to_string()]);
    }

    #[test]
    fn test_exact_filters_follow_keyword() {
        let query = LocalNoteQuery {
            keyword: Some("calc".to_string()),
            user_id: Some("u1".to_string()),
            category: None,
            language: Some("French".to_string()),
            limit: None,
        };
        let find = build_find_query(&query);
        assert!(find.sql.contains("AND user_id = $2"));
        assert!(find.sql.contains("AND language = $3"));
        assert!(!find.sql.contains("category ="));
        assert!(!find.sql.contains("LIMIT"));
        assert_eq!(find.binds, vec!["calc", "u1", "French"]);
        assert_eq!(find.limit, None);
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let find = build_find_query(&LocalNoteQuery::keyword("   ", 3));
        assert!(!find.sql.contains("ILIKE"));
        assert!(find.binds.is_empty());
        assert!(find.sql.ends_with("LIMIT $1"));
    }

    #[test]
    fn test_non_positive_limit_is_dropped() {
        let query = LocalNoteQuery {
            limit: Some(0),
            ..Default::default()
        };
        let find = build_find_query(&query);
        assert!(!find.sql.contains("LIMIT"));
        assert_eq!(find.limit, None);
    }
}
