//! Global configuration loader for murmur.
//!
//! Reads `config.toml` from the data directory (`~/.murmur/` by default) and
//! deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed. The API key never lives in the file; it is
//! read from the environment variable the file names.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use murmur_types::config::{GlobalConfig, ProviderConfig};
use murmur_types::error::ConfigError;

/// Default data directory: `~/.murmur`, or `./.murmur` without a home dir.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".murmur")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Load `{path}` strictly: unreadable or malformed files are errors.
///
/// Used when the caller named the file explicitly.
pub async fn load_config_file(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    toml::from_str(&content).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Resolve the API key named by `config.api_key_env` through `lookup`.
///
/// Blank values count as missing.
pub fn resolve_api_key_with<F>(config: &ProviderConfig, lookup: F) -> Result<SecretString, ConfigError>
where
    F: FnOnce(&str) -> Option<String>,
{
    match lookup(&config.api_key_env) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
        _ => Err(ConfigError::MissingApiKey(config.api_key_env.clone())),
    }
}

/// Resolve the API key from the process environment.
pub fn resolve_api_key(config: &ProviderConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}
