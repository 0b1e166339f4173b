pub mod openai;

use async_trait::async_trait;
use bytes::Bytes;

pub use openai::OpenAiClient;

#[derive(thiserror::Error, Debug)]
pub enum AiError {
    #[error("Provider rate limit exhausted")]
    RateLimited,

    #[error("Provider rejected credentials")]
    Unauthorized,

    #[error("Provider call failed: {0}")]
    Upstream(String),
}

/// Turns a system message and user prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_message: &str, prompt: &str) -> Result<String, AiError>;
}

/// Turns text into raw audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Bytes, AiError>;
}
