//! lingua-import - Content Import & Classification service
//!
//! Accepts batches of learning items from the admin tool, routes each one
//! to a module and CEFR level, and merges them into the per-module,
//! per-level JSON partitions served to the exercise client.

use anyhow::{Context, Result};
use clap::Parser;
use lingua_common::config::{self, CompiledDefaults, DataRootResolver, TomlConfig};
use lingua_common::CefrIndex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lingua_import::{build_router, AppState, JsonFileStore};

/// Command-line arguments for lingua-import
#[derive(Parser, Debug)]
#[command(name = "lingua-import")]
#[command(about = "Content import and classification service for Lingua")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Data root holding <module>/lvl<n>.json partitions
    #[arg(short, long)]
    data_root: Option<PathBuf>,

    /// TOML bootstrap config (defaults to ~/.config/lingua/config.toml)
    #[arg(short, long, env = "LINGUA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", toml.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lingua-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_root = DataRootResolver::new(args.data_root, &toml).resolve();
    std::fs::create_dir_all(&data_root)
        .with_context(|| format!("Failed to create data root {}", data_root.display()))?;
    info!("Data root: {}", data_root.display());

    let wordlist_dir = config::wordlist_dir(&toml, &data_root);
    let wordlists = CefrIndex::load(&wordlist_dir);
    info!(
        words = wordlists.len(),
        "CEFR wordlists loaded from {}",
        wordlist_dir.display()
    );

    let store = Arc::new(JsonFileStore::new(data_root));
    let state = AppState::new(store, wordlists, wordlist_dir);
    let app = build_router(state);

    let port = args
        .port
        .or(toml.port)
        .unwrap_or(CompiledDefaults::default().port);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on http://localhost:{}", port);
    info!("Health check: http://localhost:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
