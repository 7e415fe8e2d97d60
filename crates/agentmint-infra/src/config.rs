//! Configuration loader for agentmint.
//!
//! Reads `config.toml` from the config directory (`~/.agentmint/` unless
//! `AGENTMINT_HOME` is set) into [`AppConfig`]. A missing or malformed file
//! falls back to defaults.

use std::path::{Path, PathBuf};

use agentmint_types::config::AppConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the config directory.
///
/// Priority:
/// 1. `AGENTMINT_HOME` environment variable
/// 2. `~/.agentmint`
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AGENTMINT_HOME") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".agentmint");
    }

    PathBuf::from(".agentmint")
}

/// Load `{config_dir}/config.toml`.
pub async fn load_config(config_dir: &Path) -> AppConfig {
    let config_path = config_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %config_path.display(), %err, "failed to read config, using defaults");
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %config_path.display(), %err, "failed to parse config, using defaults");
            AppConfig::default()
        }
    }
}
