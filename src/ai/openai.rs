use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{AiError, SpeechSynthesizer, TextGenerator};

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

const CHAT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.8;

const SPEECH_MODEL: &str = "tts-1";
const VOICE: &str = "alloy";
const SPEED: f32 = 1.0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI adapter for both text generation and speech synthesis.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AiError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, api_key })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Maps a provider error status onto the request error taxonomy. Quota and
/// auth failures surface distinctly; everything else is a generic upstream
/// failure carrying the status and body.
fn classify_status(status: StatusCode, body: String) -> AiError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Unauthorized,
        _ => AiError::Upstream(format!("provider returned {status}: {body}")),
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Upstream(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, system_message: &str, prompt: &str) -> Result<String, AiError> {
        let response = self
            .http
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": CHAT_MODEL,
                "messages": [
                    { "role": "system", "content": system_message },
                    { "role": "user", "content": prompt },
                ],
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let completion: ChatCompletion = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::Upstream("provider returned no choices".to_string()))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiClient {
    async fn synthesize(&self, text: &str) -> Result<Bytes, AiError> {
        let response = self
            .http
            .post(SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": SPEECH_MODEL,
                "input": text,
                "voice": VOICE,
                "response_format": "mp3",
                "speed": SPEED,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        Ok(response.bytes().await?)
    }
}
