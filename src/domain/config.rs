//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for backend endpoints, workspace defaults, and timeouts.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote endpoints the backend talks to.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the prompt generation service.
    #[serde(default = "default_generate_url")]
    pub generate_url: String,
    /// Base URL of the website building service.
    #[serde(default = "default_website_url")]
    pub website_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            generate_url: default_generate_url(),
            website_url: default_website_url(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct WorkspaceConfig {
    /// Initial workspace root. Usually unset; the editor supplies it with
    /// a `config` protocol message.
    #[serde(default)]
    pub path: Option<String>,
}

/// Timeouts in seconds for every outbound/blocking operation.
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
    #[serde(default = "default_run_timeout")]
    pub run: u64,
    #[serde(default = "default_website_chat_timeout")]
    pub website_chat: u64,
    #[serde(default = "default_website_stream_timeout")]
    pub website_stream: u64,
    #[serde(default = "default_health_timeout")]
    pub health: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
            run: default_run_timeout(),
            website_chat: default_website_chat_timeout(),
            website_stream: default_website_stream_timeout(),
            health: default_health_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
        }
    }
}

fn default_generate_url() -> String {
    "https://ai-code-backend1.onrender.com".to_string()
}
fn default_website_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_request_timeout() -> u64 {
    120
}
fn default_run_timeout() -> u64 {
    10
}
fn default_website_chat_timeout() -> u64 {
    30
}
fn default_website_stream_timeout() -> u64 {
    300
}
fn default_health_timeout() -> u64 {
    2
}
fn default_log_dir() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}

impl AppConfig {
    /// Loads the configuration, trying the explicit path, then
    /// `data/config.yaml`, then the per-user config directory. A missing
    /// file yields the built-in defaults; a malformed file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            return serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()));
        }

        for path in Self::candidate_paths() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                return serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file {}", path.display()));
            }
        }

        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("data/config.yaml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("codemate").join("config.yaml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: AppConfig = serde_yaml::from_str("backend:\n  website_url: http://localhost:9000\n").unwrap();
        assert_eq!(config.backend.website_url, "http://localhost:9000");
        assert_eq!(config.backend.generate_url, default_generate_url());
        assert_eq!(config.timeouts.run, 10);
        assert_eq!(config.timeouts.request, 120);
        assert!(config.workspace.path.is_none());
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.logging.dir, "data");
        assert_eq!(config.logging.file, "session.log");
        assert_eq!(config.timeouts.website_stream, 300);
    }

    #[test]
    fn workspace_path_round_trips() {
        let config: AppConfig =
            serde_yaml::from_str("workspace:\n  path: /tmp/demo\n").unwrap();
        assert_eq!(config.workspace.path.as_deref(), Some("/tmp/demo"));
    }
}
