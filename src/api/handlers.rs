use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::range::{self, ByteRange};
use super::{
    ChatRequest, ChatResponse, CleanupResponse, ConfigResponse, HealthResponse, NotFoundResponse,
};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::store::AudioStream;

/// Persona applied when the client does not supply a system message.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a friendly voice assistant. \
    Keep your answers short and conversational, since they will be read aloud.";

/// Age past which cleanup deletes an audio file.
const MAX_AUDIO_AGE: Duration = Duration::from_secs(60 * 60);

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let prompt = request.prompt.as_deref().unwrap_or("").trim().to_string();
    if prompt.is_empty() {
        return Err(AppError::BadRequest(
            "Prompt is required and cannot be empty".into(),
        ));
    }

    let system_message = effective_system_message(request.system_message.as_deref());

    let text = state.generator.generate(&system_message, &prompt).await?;
    let audio = state.synthesizer.synthesize(&text).await?;
    let artifact = state.store.write(audio).await?;

    tracing::info!(
        "Chat request produced {} chars of text and audio file {}",
        text.chars().count(),
        artifact.file_name
    );

    Ok(Json(ChatResponse {
        success: true,
        prompt_length: prompt.chars().count(),
        response_length: text.chars().count(),
        text_response: text,
        audio_url: artifact.url_path,
        audio_file_name: artifact.file_name,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

fn effective_system_message(provided: Option<&str>) -> String {
    provided
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYSTEM_MESSAGE)
        .to_string()
}

pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // Traversal-shaped names never reach the store
    if !is_safe_file_name(&filename) {
        return Err(AppError::AudioNotFound(filename));
    }

    let audio = state.store.open(&filename).await?;
    serve_audio(audio, &headers).await
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

async fn serve_audio(audio: AudioStream, headers: &HeaderMap) -> Result<Response, AppError> {
    let requested = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| range::parse(v, audio.len));

    match requested {
        Some(ByteRange::Unsatisfiable) => Ok((
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, format!("bytes */{}", audio.len))],
        )
            .into_response()),

        Some(ByteRange::Slice { start, end }) => {
            let mut reader = audio.reader;
            reader.seek(SeekFrom::Start(start)).await?;
            let body = Body::from_stream(ReaderStream::new(reader.take(end - start + 1)));

            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (
                        header::CONTENT_RANGE,
                        format!("bytes {start}-{end}/{}", audio.len),
                    ),
                    (header::CONTENT_LENGTH, (end - start + 1).to_string()),
                ],
                body,
            )
                .into_response())
        }

        None => {
            let body = Body::from_stream(ReaderStream::new(audio.reader));

            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (header::CONTENT_LENGTH, audio.len.to_string()),
                ],
                body,
            )
                .into_response())
        }
    }
}

pub async fn cleanup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CleanupResponse>, AppError> {
    let deleted = state.store.purge(MAX_AUDIO_AGE).await?;

    tracing::info!("Cleanup removed {} audio file(s)", deleted);

    Ok(Json(CleanupResponse {
        message: format!("Cleanup complete, removed {deleted} stale audio file(s)"),
        deleted_count: deleted,
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn config_info(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.clone(),
        has_api_key: state.has_api_key,
        audio_dir: state.audio_dir.clone(),
        server_time: Utc::now().to_rfc3339(),
    })
}

pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Route not found".to_string(),
            routes: vec![
                "GET /api/health",
                "POST /api/chat",
                "GET /audio/:filename",
                "DELETE /api/cleanup",
                "GET /api/config",
            ],
        }),
    )
}
