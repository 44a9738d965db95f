//! Service configuration: a TOML file overridden by the environment
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "LPA_STORE_DB_PATH";
pub const ENV_LOG: &str = "LPA_STORE_LOG";
pub const ENV_LOG_FORMAT: &str = "LPA_STORE_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "opg-data-lpa-store".to_string(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lpa-store.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Reads `path` if it exists, falling back to defaults, then applies the
/// environment overrides.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(path) = var(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
        config.store.path = PathBuf::from(path);
    }

    if let Some(filter) = var(ENV_LOG).filter(|v| !v.trim().is_empty()) {
        config.logging.filter = filter;
    }

    if let Some(raw) = var(ENV_LOG_FORMAT) {
        match LogFormat::parse(&raw) {
            Some(format) => config.logging.format = format,
            None => tracing::warn!("ignoring {ENV_LOG_FORMAT}={raw}, expected pretty or json"),
        }
    }
}
