//! Tracing subscriber setup
use tracing_subscriber::EnvFilter;

use super::config::{Config, ENV_LOG, LogFormat, LoggingConfig};

/// Installs the global subscriber. `LPA_STORE_LOG` takes precedence over the
/// configured filter. Returns an error if a subscriber is already set.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let filter = env_filter(&config.logging, std::env::var(ENV_LOG).ok());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.logging.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(service = %config.service_name, format = ?config.logging.format, "logging initialised");
    Ok(())
}

/// The first of `env` and the configured filter that parses, else `info`.
fn env_filter(config: &LoggingConfig, env: Option<String>) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(&config.filter).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
