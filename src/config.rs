use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::translate::registry::DEFAULT_INDEX_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: PathBuf,
    pub package_index_url: String,
    pub translate_url: String,
    pub translate_api_key: Option<String>,
    pub kokoro_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port_raw = var("PORT", "8000");
        let port = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            models_dir: var("MODELS_DIR", "./models/translate").into(),
            package_index_url: var("PACKAGE_INDEX_URL", DEFAULT_INDEX_URL),
            translate_url: var("TRANSLATE_URL", "http://localhost:5000"),
            translate_api_key: lookup("TRANSLATE_API_KEY").filter(|k| !k.is_empty()),
            kokoro_dir: var("KOKORO_DIR", "./models/kokoro").into(),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}
