//! Admin import API handlers
//!
//! POST /admin/import, POST /admin/import/preview, POST /admin/wordlists/reload

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use lingua_common::{CefrIndex, CefrTier};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::import::{Classifier, ImportOutcome, ImportRequest, Importer, PreviewReport};
use crate::AppState;

/// POST /admin/wordlists/reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub ok: bool,
    /// Normalized word count per tier (A1..B2)
    pub tiers: BTreeMap<&'static str, usize>,
    pub total: usize,
}

fn parse_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<ImportRequest> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(ImportRequest::from_json(body)?)
}

/// POST /admin/import
///
/// Body: a bare array of items or `{ items, mode?, defaultLevel? }`.
/// Imports run one at a time.
pub async fn import_items(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ImportOutcome>> {
    let request = parse_body(body)?;

    let _guard = state.import_lock.lock().await;
    let wordlists = state.wordlists().await;
    let store = state.store.clone();

    tracing::info!(
        items = request.items.len(),
        mode = ?request.mode,
        default_level = %request.default_level,
        "Import started"
    );

    let outcome = tokio::task::spawn_blocking(move || {
        Importer::new(store.as_ref(), &wordlists).run(request)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Import task failed: {}", e)))??;

    Ok(Json(outcome))
}

/// POST /admin/import/preview
///
/// Same body as `/admin/import`; reports buckets, reroutes and unassigned
/// keys without writing anything.
pub async fn preview_import(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PreviewReport>> {
    let request = parse_body(body)?;
    let wordlists = state.wordlists().await;

    let report = Classifier::new(&wordlists).preview(&request);
    tracing::debug!(
        buckets = report.buckets.len(),
        reroutes = report.reroutes.len(),
        "Import preview"
    );
    Ok(Json(report))
}

/// POST /admin/wordlists/reload
///
/// Re-reads the CEFR lists from disk and swaps them in for later imports.
pub async fn reload_wordlists(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let dir = state.wordlist_dir.clone();
    let index = tokio::task::spawn_blocking(move || CefrIndex::load(&dir))
        .await
        .map_err(|e| ApiError::Internal(format!("Wordlist reload failed: {}", e)))?;

    let tiers = CefrTier::ALL
        .iter()
        .map(|tier| (tier.label(), index.tier(*tier).len()))
        .collect();
    let total = index.len();

    *state.wordlists.write().await = Arc::new(index);
    tracing::info!(total, dir = %state.wordlist_dir.display(), "CEFR wordlists reloaded");

    Ok(Json(ReloadResponse {
        ok: true,
        tiers,
        total,
    }))
}

/// Build admin import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/import", post(import_items))
        .route("/admin/import/preview", post(preview_import))
        .route("/admin/wordlists/reload", post(reload_wordlists))
}
