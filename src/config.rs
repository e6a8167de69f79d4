//! Layered configuration for the taskdeck client.
//!
//! Values resolve file → environment → CLI, later layers winning:
//!
//! ```toml
//! # ~/.config/taskdeck/config.toml
//! api_url = "https://tasks.example.com"
//! session_file = "/home/ann/.config/taskdeck/session.json"
//! timeout_secs = 30
//! ```
//!
//! Environment: `TASKDECK_API_URL`, `TASKDECK_SESSION_FILE`,
//! `TASKDECK_TIMEOUT_SECS`. The CLI's global `--api-url` flag overrides
//! everything.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Where the access/refresh token pair is persisted.
    pub session_file: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// On-disk configuration file shape. Every field is optional; omitted
/// values fall through to the environment and then the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Environment-variable layer, captured once so resolution is testable
/// without mutating process state.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl EnvOverrides {
    pub fn capture() -> Self {
        Self {
            api_url: std::env::var("TASKDECK_API_URL").ok(),
            session_file: std::env::var("TASKDECK_SESSION_FILE").ok().map(PathBuf::from),
            timeout_secs: std::env::var("TASKDECK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

impl Config {
    /// Resolve configuration from the default file location, the current
    /// environment and an optional CLI override.
    pub fn load(cli_api_url: Option<String>) -> Result<Self> {
        let file = match Self::default_config_path() {
            Some(path) if path.exists() => ConfigFile::load(&path)?,
            _ => ConfigFile::default(),
        };
        Ok(Self::resolve(file, EnvOverrides::capture(), cli_api_url))
    }

    /// Pure layering step: file, then env, then CLI.
    pub fn resolve(file: ConfigFile, env: EnvOverrides, cli_api_url: Option<String>) -> Self {
        let api_url = cli_api_url
            .or(env.api_url)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_file = env
            .session_file
            .or(file.session_file)
            .unwrap_or_else(Self::default_session_path);
        let timeout_secs = env
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_file,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.toml"))
    }

    fn default_session_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskdeck")
            .join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_all_layers_are_empty() {
        let config = Config::resolve(ConfigFile::default(), EnvOverrides::default(), None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.session_file.ends_with("taskdeck/session.json"));
    }

    #[test]
    fn cli_flag_beats_env_and_file() {
        let file = ConfigFile {
            api_url: Some("http://from-file:8000".into()),
            ..Default::default()
        };
        let env = EnvOverrides {
            api_url: Some("http://from-env:8000".into()),
            ..Default::default()
        };
        let config = Config::resolve(file, env, Some("http://from-cli:8000".into()));
        assert_eq!(config.api_url, "http://from-cli:8000");
    }

    #[test]
    fn env_beats_file() {
        let file = ConfigFile {
            api_url: Some("http://from-file:8000".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let env = EnvOverrides {
            api_url: Some("http://from-env:8000".into()),
            ..Default::default()
        };
        let config = Config::resolve(file, env, None);
        assert_eq!(config.api_url, "http://from-env:8000");
        // env did not override the timeout, so the file value holds
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let config = Config::resolve(
            ConfigFile::default(),
            EnvOverrides::default(),
            Some("http://localhost:8000/".into()),
        );
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn config_file_parses_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://tasks.example.com\"\ntimeout_secs = 10\n")
            .unwrap();
        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.api_url.as_deref(), Some("https://tasks.example.com"));
        assert_eq!(file.timeout_secs, Some(10));
        assert!(file.session_file.is_none());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [not toml").unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }
}
