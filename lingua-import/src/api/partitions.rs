//! Partition read API
//!
//! GET /api/:category/levels/:level returns the stored items for one
//! `(module, level)` pair. `connectors` is accepted for `conectors`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use lingua_common::{Level, Module, PartitionEntry, PartitionId};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/:category/levels/:level
pub async fn get_partition(
    State(state): State<AppState>,
    Path((category, level)): Path<(String, String)>,
) -> ApiResult<Json<Vec<PartitionEntry>>> {
    let module: Module = category
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown category: {}", category)))?;
    let level = level
        .parse::<u8>()
        .ok()
        .and_then(Level::new)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown level: {}", level)))?;

    let partition = PartitionId::new(module, level);
    let store = state.store.clone();
    let items = tokio::task::spawn_blocking(move || store.read(partition))
        .await
        .map_err(|e| ApiError::Internal(format!("Partition read failed: {}", e)))??;

    items
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No data for {}", partition)))
}

/// Build partition routes
pub fn partition_routes() -> Router<AppState> {
    Router::new().route("/api/:category/levels/:level", get(get_partition))
}
