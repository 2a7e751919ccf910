//! lingua-import library
//!
//! Content import and classification engine for the Lingua exercise
//! platform: routes submitted learning items to a module and CEFR level and
//! merges them into persisted `(module, level)` partitions.
//!
//! Exposes the engine and the HTTP router for the binary and for tests.

pub mod api;
pub mod error;
pub mod import;
pub mod merge;
pub mod store;

pub use crate::error::{ApiError, ApiResult};
pub use crate::import::{Classifier, ImportOutcome, ImportRequest, Importer, PreviewReport};
pub use crate::merge::{ImportMode, PartitionMerger, PartitionSummary};
pub use crate::store::{JsonFileStore, MemoryStore, PartitionStore};

use axum::Router;
use lingua_common::CefrIndex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Partition storage
    pub store: Arc<dyn PartitionStore>,
    /// CEFR reference data; replaced wholesale on reload
    pub wordlists: Arc<RwLock<Arc<CefrIndex>>>,
    /// Where reference data is reloaded from
    pub wordlist_dir: PathBuf,
    /// Serializes imports so partition read-modify-writes never interleave
    pub import_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn PartitionStore>, wordlists: CefrIndex, wordlist_dir: PathBuf) -> Self {
        Self {
            store,
            wordlists: Arc::new(RwLock::new(Arc::new(wordlists))),
            wordlist_dir,
            import_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current reference data snapshot
    pub async fn wordlists(&self) -> Arc<CefrIndex> {
        self.wordlists.read().await.clone()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::partition_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
