//! Route-level tests driving the router with in-memory sources.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use notemart_api::{router, AppState};
use notemart_core::{
    Error, ExternalMetadata, ExternalQuery, ExternalRecord, ExternalRecordRepository,
    LocalNoteQuery, LocalNoteRecord, LocalNoteStore, Result,
};
use notemart_search::{AggregatorConfig, NoteSearchAggregator};

struct FixedLocal(Vec<LocalNoteRecord>);

#[async_trait]
impl LocalNoteStore for FixedLocal {
    async fn find_notes(&self, query: &LocalNoteQuery) -> Result<Vec<LocalNoteRecord>> {
        let limit = query.limit.unwrap_or(i64::MAX) as usize;
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

/// Records the query it receives.
#[derive(Default)]
struct RecordingLocal {
    last_query: Mutex<Option<LocalNoteQuery>>,
}

#[async_trait]
impl LocalNoteStore for RecordingLocal {
    async fn find_notes(&self, query: &LocalNoteQuery) -> Result<Vec<LocalNoteRecord>> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        Ok(vec![local("n2", "Newer"), local("n1", "Older")])
    }
}

struct FailingLocal;

#[async_trait]
impl LocalNoteStore for FailingLocal {
    async fn find_notes(&self, _query: &LocalNoteQuery) -> Result<Vec<LocalNoteRecord>> {
        Err(Error::local_unavailable("pool timed out after 10s on 10.0.0.3"))
    }
}

struct FailingExternal;

#[async_trait]
impl ExternalRecordRepository for FailingExternal {
    async fn search_records(&self, _query: &ExternalQuery) -> Result<Vec<ExternalRecord>> {
        Err(Error::external_unavailable("Zenodo returned 502 Bad Gateway: upstream"))
    }
}

struct FixedExternal(Vec<ExternalRecord>);

#[async_trait]
impl ExternalRecordRepository for FixedExternal {
    async fn search_records(&self, query: &ExternalQuery) -> Result<Vec<ExternalRecord>> {
        Ok(self.0.iter().take(query.size as usize).cloned().collect())
    }
}

fn local(id: &str, title: &str) -> LocalNoteRecord {
    LocalNoteRecord {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        description: Some("d".repeat(200)),
        owner_id: Some("u1".to_string()),
        file_url: Some(format!("/uploads/{}.pdf", id)),
        price: Some(12.5),
        is_free: Some(false),
        ..Default::default()
    }
}

fn external(id: &str) -> ExternalRecord {
    ExternalRecord {
        id: Some(id.to_string()),
        metadata: ExternalMetadata {
            title: Some(format!("Record {}", id)),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn app(external: Arc<dyn ExternalRecordRepository>) -> axum::Router {
    app_with(
        Arc::new(FixedLocal(vec![local("a", "Algebra"), local("b", "Biology")])),
        external,
    )
}

fn app_with(
    local: Arc<dyn LocalNoteStore>,
    external: Arc<dyn ExternalRecordRepository>,
) -> axum::Router {
    let aggregator = NoteSearchAggregator::new(local, external, AggregatorConfig::default());
    router(
        AppState::new(aggregator),
        vec![HeaderValue::from_static("http://localhost:5173")],
    )
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(Arc::new(FailingExternal)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_search_reports_sources() {
    let (status, body) = get_json(
        app(Arc::new(FixedExternal(vec![external("z1")]))),
        "/api/notes/search?q=algebra&limit=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let notes = body["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[0]["id"], "a");
    assert_eq!(notes[0]["source"], "local");
    assert_eq!(notes[0]["isFree"], false);
    assert_eq!(notes[0]["price"], 12.5);
    assert_eq!(notes[2]["source"], "external");
    assert_eq!(notes[2]["ownerId"], "zenodo");

    assert_eq!(body["sources"]["local"]["status"], "succeeded");
    assert_eq!(body["sources"]["local"]["count"], 2);
    assert_eq!(body["sources"]["external"]["status"], "succeeded");
}

#[tokio::test]
async fn test_search_with_failed_external_hides_reason() {
    let (status, body) = get_json(
        app(Arc::new(FailingExternal)),
        "/api/notes/search?q=algebra",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"].as_array().unwrap().len(), 2);
    assert_eq!(body["sources"]["external"], serde_json::json!({"status": "failed"}));
}

#[tokio::test]
async fn test_search_without_query_skips_sources() {
    let (status, body) = get_json(app(Arc::new(FailingExternal)), "/api/notes/search").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["notes"].as_array().unwrap().is_empty());
    assert_eq!(body["sources"]["local"]["status"], "skipped");
    assert_eq!(body["sources"]["external"]["status"], "skipped");
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    for uri in [
        "/api/notes/search?q=algebra&limit=0",
        "/api/notes/search?q=algebra&limit=-3",
        "/api/notes/search?q=algebra&limit=lots",
        "/api/notes/popular?limit=0",
    ] {
        let (status, body) = get_json(app(Arc::new(FailingExternal)), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_suggest_returns_projection() {
    let (status, body) = get_json(
        app(Arc::new(FailingExternal)),
        "/api/notes/suggest?q=algebra&limit=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body.as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["id"], "a");
    assert_eq!(suggestions[0]["snippet"].as_str().unwrap().chars().count(), 120);
    assert_eq!(suggestions[0]["fileUrl"], "/uploads/a.pdf");
    assert!(suggestions[0].get("description").is_none());
}

#[tokio::test]
async fn test_popular_lists_external_records() {
    let (status, body) = get_json(
        app(Arc::new(FixedExternal(vec![external("p1"), external("p2")]))),
        "/api/notes/popular?limit=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], "p1");
}

#[tokio::test]
async fn test_list_forwards_filters() {
    let store = Arc::new(RecordingLocal::default());
    let (status, body) = get_json(
        app_with(store.clone(), Arc::new(FailingExternal)),
        "/api/notes?q=%20algebra%20&userId=u1&category=math&language=en&limit=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["id"], "n2");
    assert_eq!(notes[0]["source"], "local");

    let query = store.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(
        query,
        LocalNoteQuery {
            keyword: Some("algebra".to_string()),
            user_id: Some("u1".to_string()),
            category: Some("math".to_string()),
            language: Some("en".to_string()),
            limit: Some(5),
        }
    );
}

#[tokio::test]
async fn test_list_without_filters_uses_default_limit() {
    let store = Arc::new(RecordingLocal::default());
    let (status, _) = get_json(
        app_with(store.clone(), Arc::new(FailingExternal)),
        "/api/notes?q=&category=",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let query = store.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(query.keyword, None);
    assert_eq!(query.category, None);
    assert_eq!(query.limit, Some(50));
}

#[tokio::test]
async fn test_list_store_failure_is_unavailable() {
    let (status, body) =
        get_json(app_with(Arc::new(FailingLocal), Arc::new(FailingExternal)), "/api/notes").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("10.0.0.3"));
}

#[tokio::test]
async fn test_list_invalid_limit_is_bad_request() {
    let (status, _) = get_json(app(Arc::new(FailingExternal)), "/api/notes?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let response = app(Arc::new(FailingExternal))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let response = app(Arc::new(FailingExternal))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("http://localhost:5173"))
    );

    let response = app(Arc::new(FailingExternal))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
