use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set; refusing to start without a provider credential")]
    MissingApiKey,

    #[error("PORT must be a number, got '{0}'")]
    InvalidPort(String),
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub audio_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_raw = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;

        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let audio_dir: PathBuf = std::env::var("AUDIO_DIR")
            .unwrap_or_else(|_| "./audio".to_string())
            .into();

        Ok(Config {
            api_key,
            host,
            port,
            environment,
            audio_dir,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
