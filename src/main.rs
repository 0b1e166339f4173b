use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod ai;
mod api;
mod config;
mod error;
mod store;

use ai::OpenAiClient;
use api::routes::{create_router, AppState};
use config::Config;
use store::FsAudioStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment; a missing credential is fatal
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    error::set_expose_detail(!config.is_production());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("Voice Chat Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Audio directory: {}", config.audio_dir.display());

    // One OpenAI client serves both trait seams
    let client = match OpenAiClient::new(config.api_key.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to build provider client: {e}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        generator: client.clone(),
        synthesizer: client,
        store: Arc::new(FsAudioStore::new(config.audio_dir.clone())),
        environment: config.environment.clone(),
        audio_dir: config.audio_dir.display().to_string(),
        has_api_key: !config.api_key.is_empty(),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
