use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::ai::{SpeechSynthesizer, TextGenerator};
use crate::store::AudioStore;

pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub store: Arc<dyn AudioStore>,
    pub environment: String,
    pub audio_dir: String,
    pub has_api_key: bool,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .route("/cleanup", delete(handlers::cleanup))
        .route("/config", get(handlers::config_info));

    Router::new()
        .nest("/api", api_routes)
        .route("/audio/:filename", get(handlers::get_audio))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
