//! Server configuration

use forms_core::FormsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Path of an optional TOML config file
pub const CONFIG_ENV: &str = "FORMS_API_CONFIG";
/// Overrides `bind_addr`
pub const BIND_ENV: &str = "FORMS_API_BIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
    pub max_body_bytes: usize,
    pub forms: FormsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            log_level: "info".into(),
            max_body_bytes: 1024 * 1024,
            forms: FormsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// File named by `FORMS_API_CONFIG` (if any) plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(std::env::var(BIND_ENV).ok(), std::env::var("RUST_LOG").ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_overrides(&mut self, bind: Option<String>, log: Option<String>) {
        if let Some(bind) = bind.filter(|b| !b.is_empty()) {
            self.bind_addr = bind;
        }
        if let Some(log) = log.filter(|l| !l.is_empty()) {
            self.log_level = log;
        }
    }
}
