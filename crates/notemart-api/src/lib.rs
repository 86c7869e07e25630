//! # notemart-api
//!
//! HTTP surface over the note search aggregator. Handlers translate query
//! strings into aggregator calls and map errors to JSON responses; all search
//! behavior lives in `notemart-search`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};
use uuid::Uuid;

use notemart_core::{defaults, LocalNoteQuery};
use notemart_search::{NoteSearchAggregator, NormalizedNote, SourceOutcome, Suggestion};

// =============================================================================
// STATE
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<NoteSearchAggregator>,
}

impl AppState {
    pub fn new(aggregator: NoteSearchAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with tracing, request ids and CORS.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notes", get(list_notes))
        .route("/api/notes/search", get(search_notes))
        .route("/api/notes/suggest", get(suggest_notes))
        .route("/api/notes/popular", get(popular_notes))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .with_state(state)
}

/// Parse a comma-separated origin list, skipping entries that are not valid
/// header values. An empty list falls back to the development origin.
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        return vec![HeaderValue::from_static(defaults::ALLOWED_ORIGIN)];
    }
    origins
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub q: Option<String>,
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub limit: Option<i64>,
}

impl From<ListParams> for LocalNoteQuery {
    fn from(params: ListParams) -> Self {
        LocalNoteQuery {
            keyword: params.q,
            user_id: params.user_id,
            category: params.category,
            language: params.language,
            limit: params.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SourcesBody {
    pub local: SourceOutcome,
    pub external: SourceOutcome,
}

#[derive(Debug, Serialize)]
pub struct SearchBody {
    pub notes: Vec<NormalizedNote>,
    pub sources: SourcesBody,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_notes(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<NormalizedNote>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.aggregator.browse(params.into()).await?))
}

async fn search_notes(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchBody>, ApiError> {
    let Query(params) = params?;
    let report = state
        .aggregator
        .search_with_report(&params.q, params.limit)
        .await?;

    Ok(Json(SearchBody {
        notes: report.notes,
        sources: SourcesBody {
            local: report.local,
            external: report.external,
        },
    }))
}

async fn suggest_notes(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(
        state.aggregator.suggest(&params.q, params.limit).await,
    ))
}

async fn popular_notes(
    State(state): State<AppState>,
    params: Result<Query<PopularParams>, QueryRejection>,
) -> Result<Json<Vec<NormalizedNote>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.aggregator.popular(params.limit).await?))
}

// =============================================================================
// ERRORS
// =============================================================================

/// Handler error rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ServiceUnavailable(notemart_core::Error),
    Internal(notemart_core::Error),
}

impl From<notemart_core::Error> for ApiError {
    fn from(err: notemart_core::Error) -> Self {
        match err {
            notemart_core::Error::InvalidArgument(msg) => ApiError::BadRequest(msg),
            err if err.is_source_failure() => ApiError::ServiceUnavailable(err),
            other => ApiError::Internal(other),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(err) => {
                warn!(error = %err, "Note source unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "note source unavailable".to_string(),
                )
            }
            ApiError::Internal(err) => {
                error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://notes.example.com, http://localhost:5173 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://notes.example.com");
        assert_eq!(origins[1], "http://localhost:5173");
    }

    #[test]
    fn test_parse_allowed_origins_falls_back_to_default() {
        let origins = parse_allowed_origins("  ");
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:5173")]);
    }

    #[test]
    fn test_list_params_use_camel_case() {
        let params: ListParams =
            serde_json::from_value(serde_json::json!({"userId": "u1", "q": "algebra"})).unwrap();
        let query = LocalNoteQuery::from(params);
        assert_eq!(query.user_id.as_deref(), Some("u1"));
        assert_eq!(query.keyword.as_deref(), Some("algebra"));
        assert_eq!(query.category, None);
    }

    #[test]
    fn test_error_status_mapping() {
        let err = ApiError::from(notemart_core::Error::InvalidArgument("limit".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(notemart_core::Error::local_unavailable("pool timed out"));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(notemart_core::Error::Internal("boom".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
