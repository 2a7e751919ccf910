//! Integration tests for lingua-import HTTP endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Request validation (400 with `{ "error" }` body)
//! - Import commit and preview
//! - Partition reads, including the `connectors` alias
//! - Wordlist reload

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use lingua_common::{CefrIndex, Item, Level, Module, PartitionId};
use lingua_import::{build_router, AppState, JsonFileStore, MemoryStore};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: reference data with a handful of words
fn test_wordlists() -> CefrIndex {
    CefrIndex::from_raw_lists([
        vec!["cat", "dog"],
        vec!["morning"],
        vec!["fox"],
        vec!["however"],
    ])
}

/// Test helper: app over an in-memory store
fn setup_app(store: Arc<MemoryStore>) -> axum::Router {
    let state = AppState::new(store, test_wordlists(), PathBuf::from("/nonexistent"));
    build_router(state)
}

/// Test helper: app over JSON files in `root`
fn setup_file_app(root: &Path, wordlist_dir: &Path) -> axum::Router {
    let store = Arc::new(JsonFileStore::new(root));
    let state = AppState::new(store, CefrIndex::load(wordlist_dir), wordlist_dir.to_path_buf());
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn vocab(level: u8) -> PartitionId {
    PartitionId::new(Module::Vocabulary, Level::new(level).unwrap())
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(Arc::new(MemoryStore::new()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lingua-import");
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn test_import_commits_and_summarizes() {
    let store = Arc::new(MemoryStore::new());
    let app = setup_app(store.clone());

    let request = post_json(
        "/admin/import",
        &json!({
            "items": [
                { "word": "Cat", "translations": ["gato"] },
                { "word": "good morning" },
                { "connector": "However", "sentence": "However, it rained." }
            ],
            "mode": "append",
            "defaultLevel": 2
        }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["summary"],
        json!([
            { "file": "vocabulary/lvl1.json", "added": 1, "total": 1 },
            { "file": "phrases/lvl2.json", "added": 1, "total": 1 },
            { "file": "conectors/lvl4.json", "added": 1, "total": 1 }
        ])
    );

    let stored = store.get(vocab(1)).unwrap();
    assert_eq!(stored[0].lookup_key().as_deref(), Some("cat"));
}

#[tokio::test]
async fn test_import_rejects_empty_items() {
    let app = setup_app(Arc::new(MemoryStore::new()));

    for body in [json!({ "items": [] }), json!({}), json!([])] {
        let response = app
            .clone()
            .oneshot(post_json("/admin/import", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);

        let body = extract_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().contains("items array required"));
    }
}

#[tokio::test]
async fn test_import_rejects_malformed_json() {
    let store = Arc::new(MemoryStore::new());
    let app = setup_app(store.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/admin/import")
        .header("content-type", "application/json")
        .body(Body::from("{ \"items\": [ "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_import_write_failure_is_server_error() {
    let store = Arc::new(MemoryStore::new());
    store.fail_writes_to(vocab(1));
    let app = setup_app(store);

    let response = app
        .oneshot(post_json("/admin/import", &json!([{ "word": "cat" }])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("vocabulary/lvl1.json"));
}

#[tokio::test]
async fn test_preview_does_not_write() {
    let store = Arc::new(MemoryStore::new());
    let app = setup_app(store.clone());

    let response = app
        .oneshot(post_json(
            "/admin/import/preview",
            &json!([
                { "word": "had finished" },
                { "phrase": "Hello" },
                { "word": "dog" },
                { "translations": ["?"] }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["buckets"],
        json!([
            { "partition": "tenses:lvl1", "count": 1 },
            { "partition": "vocabulary:lvl1", "count": 2 }
        ])
    );
    assert_eq!(body["unassigned"]["tenses"], json!(["had finished"]));
    assert_eq!(body["unassigned"]["vocabulary"], json!(["hello"]));
    assert_eq!(body["reroutes"][0]["from"], "vocabulary");
    assert_eq!(body["reroutes"][0]["to"], "tenses");
    assert_eq!(body["skipped"], 1);

    assert!(store.writes().is_empty());
}

// =============================================================================
// Partition reads
// =============================================================================

#[tokio::test]
async fn test_get_partition_and_alias() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        PartitionId::new(Module::Conectors, Level::new(2).unwrap()),
        vec![Item::connector("moreover").with_translations(["además"])],
    );
    let app = setup_app(store);

    for uri in ["/api/conectors/levels/2", "/api/connectors/levels/2"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body, json!([{ "connector": "moreover", "translations": ["además"] }]));
    }
}

#[tokio::test]
async fn test_get_partition_not_found() {
    let app = setup_app(Arc::new(MemoryStore::new()));

    for uri in [
        "/api/vocabulary/levels/1",
        "/api/grammar/levels/1",
        "/api/vocabulary/levels/7",
        "/api/vocabulary/levels/one",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = extract_json(response.into_body()).await;
        assert!(body["error"].is_string());
    }
}

// =============================================================================
// Wordlist reload
// =============================================================================

#[tokio::test]
async fn test_wordlist_reload_changes_level_assignment() {
    let data = tempfile::tempdir().unwrap();
    let lists = tempfile::tempdir().unwrap();
    let app = setup_file_app(data.path(), lists.path());

    // No lists yet: default level
    let response = app
        .clone()
        .oneshot(post_json("/admin/import", &json!([{ "word": "zebra" }])))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary"][0]["file"], "vocabulary/lvl1.json");

    std::fs::write(lists.path().join("b1.json"), r#"["Zebra", "zebra", "lion"]"#).unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/admin/wordlists/reload", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["tiers"]["B1"], 2);
    assert_eq!(body["tiers"]["A1"], 0);
    assert_eq!(body["total"], 2);

    // Same item again: moves to level 3 and leaves level 1
    let response = app
        .clone()
        .oneshot(post_json("/admin/import", &json!([{ "word": "zebra" }])))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary"][0]["file"], "vocabulary/lvl3.json");
    assert_eq!(body["summary"][0]["added"], 1);

    let response = app.oneshot(get("/api/vocabulary/levels/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));

    assert!(data.path().join("vocabulary/lvl3.json").exists());
}
