use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ai::AiError;
use crate::store::StoreError;

/// Whether 500 responses include failure detail. Set once at startup from the
/// deployment environment; defaults to hidden.
static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

pub fn set_expose_detail(expose: bool) {
    let _ = EXPOSE_ERROR_DETAIL.set(expose);
}

fn expose_detail() -> bool {
    *EXPOSE_ERROR_DETAIL.get().unwrap_or(&false)
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Provider rejected credentials")]
    Unauthorized,

    #[error("Audio file not found: {0}")]
    AudioNotFound(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::RateLimited => AppError::RateLimited,
            AiError::Unauthorized => AppError::Unauthorized,
            AiError::Upstream(detail) => AppError::Upstream(detail),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => AppError::AudioNotFound(name),
            StoreError::Io(e) => AppError::IoError(e),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later".to_string(),
                None,
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid API credentials".to_string(),
                None,
            ),
            AppError::AudioNotFound(_) => (
                StatusCode::NOT_FOUND,
                "Audio file not found".to_string(),
                None,
            ),
            AppError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(e.clone()),
            ),
            AppError::IoError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(e.to_string()),
            ),
        };

        tracing::error!("Request failed: {} - {}", status, self);

        let detail = detail.filter(|_| expose_detail());

        (status, Json(ErrorResponse { error: message, detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_errors_map_to_distinct_variants() {
        assert!(matches!(
            AppError::from(AiError::RateLimited),
            AppError::RateLimited
        ));
        assert!(matches!(
            AppError::from(AiError::Unauthorized),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AiError::Upstream("boom".into())),
            AppError::Upstream(_)
        ));
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = AppError::from(StoreError::NotFound("x.mp3".into()));
        assert!(matches!(err, AppError::AudioNotFound(name) if name == "x.mp3"));
    }

    async fn body_json(response: Response) -> serde_json::Value {
        use http_body_util::BodyExt;

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // Only this test touches the expose flag, so the unset default is
    // observable before flipping it
    #[tokio::test]
    async fn upstream_detail_is_hidden_until_exposed() {
        let hidden = AppError::Upstream("provider exploded".into()).into_response();
        assert_eq!(hidden.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(hidden).await;
        assert_eq!(json["error"], "Internal server error");
        assert!(json.get("detail").is_none());

        set_expose_detail(true);
        let exposed = AppError::Upstream("provider exploded".into()).into_response();
        assert_eq!(exposed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(exposed).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["detail"], "provider exploded");
    }
}
