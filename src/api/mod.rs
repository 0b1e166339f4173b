pub mod handlers;
pub mod range;
pub mod routes;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Absent and empty both fail validation with the same 400.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub system_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub text_response: String,
    pub audio_url: String,
    pub audio_file_name: String,
    pub timestamp: String,
    pub prompt_length: usize,
    pub response_length: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub version: String,
    pub environment: String,
    pub has_api_key: bool,
    pub audio_dir: String,
    pub server_time: String,
}

#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub routes: Vec<&'static str>,
}
