//! Functional tests for the generation and listing endpoints

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use text2image_gallery::{
    api::create_router,
    config::Settings,
    provider::{GeneratedImage, GenerationParams, ImageProvider},
    store::{GenerationRecord, InMemoryRecordStore, NewGenerationRecord, RecordStore},
    AppError, AppState,
};
use tower::ServiceExt;

/// Provider answering every call the same way and counting calls
struct StubProvider {
    configured: bool,
    outcome: Result<Vec<String>, String>,
    calls: AtomicUsize,
}

impl StubProvider {
    fn returning(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            outcome: Ok(urls.iter().map(|u| u.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            outcome: Ok(vec!["https://cdn/never.png".to_string()]),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(
        &self,
        _params: GenerationParams,
    ) -> text2image_gallery::Result<Vec<GeneratedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(urls) => Ok(urls
                .iter()
                .map(|url| GeneratedImage { url: url.clone() })
                .collect()),
            Err(message) => Err(AppError::Provider(message.clone())),
        }
    }
}

/// Store whose writes always fail; reads can be made to fail too
struct BrokenStore {
    fail_reads: bool,
    inserts: AtomicUsize,
}

#[async_trait]
impl RecordStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }

    async fn insert(
        &self,
        _record: NewGenerationRecord,
    ) -> text2image_gallery::Result<GenerationRecord> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Store("connection refused".to_string()))
    }

    async fn list_recent(&self) -> text2image_gallery::Result<Vec<GenerationRecord>> {
        if self.fail_reads {
            Err(AppError::Store("permission denied for table".to_string()))
        } else {
            Ok(Vec::new())
        }
    }
}

fn create_test_app(provider: Arc<dyn ImageProvider>, store: Arc<dyn RecordStore>) -> Router {
    create_router(Arc::new(AppState::new(Settings::default(), provider, store)))
}

async fn post_prompt(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_generate_then_list() {
    let provider = StubProvider::returning(&["https://cdn/x.png"]);
    let store = Arc::new(InMemoryRecordStore::new());
    let app = create_test_app(provider.clone(), store.clone());

    let (status, body) =
        post_prompt(&app, "/generate-image", r#"{"prompt":"a red fox in snow"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://cdn/x.png" }));
    assert_eq!(provider.calls(), 1);
    assert_eq!(store.len(), 1);

    let (status, body) = get(&app, "/generate-image").await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["url"], "https://cdn/x.png");
    assert_eq!(records[0]["prompt"], "a red fox in snow");
    assert_eq!(records[0]["id"], 1);
    assert!(records[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_blank_prompts_are_rejected() {
    let provider = StubProvider::returning(&["https://cdn/x.png"]);
    let store = Arc::new(InMemoryRecordStore::new());
    let app = create_test_app(provider.clone(), store.clone());

    for body in [r#"{"prompt":""}"#, r#"{"prompt":"   "}"#, r#"{}"#, r#"{"prompt":null}"#] {
        let (status, json) = post_prompt(&app, "/generate-image", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json, json!({ "error": "Prompt is required" }));
    }

    assert_eq!(provider.calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let provider = StubProvider::returning(&["https://cdn/x.png"]);
    let app = create_test_app(provider.clone(), Arc::new(InMemoryRecordStore::new()));

    let (status, json) = post_prompt(&app, "/generate-image", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = post_prompt(&app, "/generate-image", r#"{"prompt":42}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_missing_provider_key() {
    let provider = StubProvider::unconfigured();
    let store = Arc::new(InMemoryRecordStore::new());
    let app = create_test_app(provider.clone(), store.clone());

    let (status, json) = post_prompt(&app, "/generate-image", r#"{"prompt":"a cat"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Fal AI key is not configured" }));
    assert_eq!(provider.calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_no_images_generated() {
    let provider = StubProvider::returning(&[]);
    let store = Arc::new(InMemoryRecordStore::new());
    let app = create_test_app(provider, store.clone());

    let (status, json) = post_prompt(&app, "/generate-image", r#"{"prompt":"a cat"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "No image was generated" }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_provider_failure_is_reported() {
    let provider = StubProvider::failing("Fal returned 503 Service Unavailable: overloaded");
    let store = Arc::new(InMemoryRecordStore::new());
    let app = create_test_app(provider, store.clone());

    let (status, json) = post_prompt(&app, "/generate-image", r#"{"prompt":"a cat"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({ "error": "Fal returned 503 Service Unavailable: overloaded" })
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_store_insert_failure() {
    let provider = StubProvider::returning(&["https://cdn/lost.png"]);
    let store = Arc::new(BrokenStore {
        fail_reads: false,
        inserts: AtomicUsize::new(0),
    });
    let app = create_test_app(provider, store.clone());

    let (status, json) = post_prompt(&app, "/generate-image", r#"{"prompt":"a cat"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({ "error": "Failed to save image: connection refused" })
    );
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);

    let (status, json) = get(&app, "/generate-image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_listing_failure() {
    let store = Arc::new(BrokenStore {
        fail_reads: true,
        inserts: AtomicUsize::new(0),
    });
    let app = create_test_app(StubProvider::returning(&[]), store);

    let (status, json) = get(&app, "/generate-image").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({ "error": "Failed to fetch images: permission denied for table" })
    );
}

#[tokio::test]
async fn test_empty_listing() {
    let app = create_test_app(
        StubProvider::returning(&[]),
        Arc::new(InMemoryRecordStore::new()),
    );

    let (status, json) = get(&app, "/generate-image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_listing_is_newest_first_and_stable() {
    let store = Arc::new(InMemoryRecordStore::new());
    let now = chrono::Utc::now();
    for (i, offset) in [(1, -30), (2, 10), (3, -5)] {
        store
            .insert(NewGenerationRecord {
                url: format!("https://cdn/{}.png", i),
                prompt: format!("prompt {}", i),
                created_at: now + chrono::Duration::seconds(offset),
            })
            .await
            .unwrap();
    }
    let app = create_test_app(StubProvider::returning(&[]), store);

    let (status, first) = get(&app, "/generate-image").await;
    assert_eq!(status, StatusCode::OK);
    let urls: Vec<&str> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec!["https://cdn/2.png", "https://cdn/3.png", "https://cdn/1.png"]
    );

    let (_, second) = get(&app, "/generate-image").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_api_prefixed_route() {
    let provider = StubProvider::returning(&["https://cdn/y.png"]);
    let app = create_test_app(provider, Arc::new(InMemoryRecordStore::new()));

    let (status, json) =
        post_prompt(&app, "/api/generate-image", r#"{"prompt":"a lighthouse"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], "https://cdn/y.png");

    let (status, json) = get(&app, "/api/generate-image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_index_and_health() {
    let app = create_test_app(
        StubProvider::returning(&[]),
        Arc::new(InMemoryRecordStore::new()),
    );

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Text 2 Image"));

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "status": "healthy" }));
}
