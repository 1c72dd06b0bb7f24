//! Configuration loading and resolution
//!
//! Each setting resolves with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default backend base URL when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable for the backend base URL
pub const ENV_API_URL: &str = "VOXIQ_API_URL";

/// Environment variable for the bearer token
pub const ENV_TOKEN: &str = "VOXIQ_TOKEN";

/// On-disk configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash
    pub api_url: String,
    /// Bearer token, if authenticated
    pub token: Option<String>,
}

impl ClientConfig {
    /// WebSocket endpoint for processing updates, derived from the HTTP
    /// base URL
    pub fn ws_url(&self) -> String {
        let base = self
            .api_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/ws/processing", base)
    }
}

/// Resolve configuration from CLI arguments, the process environment,
/// and the platform config file
pub fn resolve_config(cli_api_url: Option<&str>, cli_token: Option<&str>) -> Result<ClientConfig> {
    let file = match load_toml_config() {
        Ok(config) => config,
        Err(Error::Config(msg)) => {
            warn!("Ignoring config file: {}", msg);
            TomlConfig::default()
        }
        Err(e) => return Err(e),
    };

    Ok(resolve_from(
        cli_api_url,
        cli_token,
        std::env::var(ENV_API_URL).ok().as_deref(),
        std::env::var(ENV_TOKEN).ok().as_deref(),
        &file,
    ))
}

/// Pure resolution core, separated from environment access for testing
pub fn resolve_from(
    cli_api_url: Option<&str>,
    cli_token: Option<&str>,
    env_api_url: Option<&str>,
    env_token: Option<&str>,
    file: &TomlConfig,
) -> ClientConfig {
    let api_url = cli_api_url
        .map(str::to_string)
        .or_else(|| env_api_url.map(str::to_string))
        .or_else(|| file.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let token = cli_token
        .map(str::to_string)
        .or_else(|| env_token.map(str::to_string))
        .or_else(|| file.token.clone());

    ClientConfig {
        api_url: api_url.trim_end_matches('/').to_string(),
        token,
    }
}

/// Default configuration file path for the platform
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("voxiq").join("config.toml"))
}

/// Load the TOML config file if present; an absent file is not an error
fn load_toml_config() -> Result<TomlConfig> {
    let Some(path) = config_file_path() else {
        return Ok(TomlConfig::default());
    };
    read_toml_config(&path)
}

/// Read a TOML config file; an absent file yields defaults
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("parse {} failed: {}", path.display(), e)))
}

/// Write the TOML config file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("create {} failed: {}", parent.display(), e)))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("serialize config failed: {}", e)))?;
    std::fs::write(path, content)
        .map_err(|e| Error::Config(format!("write {} failed: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_value_wins_over_env_and_file() {
        let file = TomlConfig {
            api_url: Some("http://file:1".to_string()),
            token: Some("file-token".to_string()),
        };
        let config = resolve_from(
            Some("http://cli:1"),
            Some("cli-token"),
            Some("http://env:1"),
            Some("env-token"),
            &file,
        );
        assert_eq!(config.api_url, "http://cli:1");
        assert_eq!(config.token.as_deref(), Some("cli-token"));
    }

    #[test]
    fn env_value_wins_over_file() {
        let file = TomlConfig {
            api_url: Some("http://file:1".to_string()),
            token: Some("file-token".to_string()),
        };
        let config = resolve_from(None, None, Some("http://env:1"), None, &file);
        assert_eq!(config.api_url, "http://env:1");
        assert_eq!(config.token.as_deref(), Some("file-token"));
    }

    #[test]
    fn defaults_apply_when_nothing_configured() {
        let config = resolve_from(None, None, None, None, &TomlConfig::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.token.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = resolve_from(Some("http://host:8000/"), None, None, None, &TomlConfig::default());
        assert_eq!(config.api_url, "http://host:8000");
    }

    #[test]
    fn ws_url_swaps_scheme() {
        let config = resolve_from(Some("https://api.voxiq.io"), None, None, None, &TomlConfig::default());
        assert_eq!(config.ws_url(), "wss://api.voxiq.io/ws/processing");

        let config = resolve_from(Some("http://localhost:8000"), None, None, None, &TomlConfig::default());
        assert_eq!(config.ws_url(), "ws://localhost:8000/ws/processing");
    }
}
