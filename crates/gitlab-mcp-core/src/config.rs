//! Configuration management for gitlab-mcp.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/gitlab-mcp/config.toml`
//! - **Windows**: `%APPDATA%\gitlab-mcp\config.toml`
//!
//! Access tokens are never stored here; they come from the command line
//! or the `GITLAB_TOKEN` environment variable.
//!
//! # Example
//!
//! ```ignore
//! use gitlab_mcp_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("gitlab.host", "https://gitlab.example.com")?;
//! config.set("server.toolsets", "issues,merge_requests")?;
//! config.save()?;
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "gitlab-mcp";

/// GitLab instance used when nothing else is configured.
pub const DEFAULT_GITLAB_HOST: &str = "https://gitlab.com";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GitLab connection settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitLabConfig>,

    /// MCP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// GitLab connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// GitLab instance URL
    #[serde(default = "default_gitlab_host")]
    pub host: String,
}

/// MCP server settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Toolsets to enable; empty means "all"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toolsets: Vec<String>,

    /// Expose only read tools
    #[serde(default)]
    pub read_only: bool,
}

fn default_gitlab_host() -> String {
    DEFAULT_GITLAB_HOST.to_string()
}

/// Split a comma-separated toolset list, dropping blanks.
pub fn parse_toolset_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// GitLab host from the file, or the public instance.
    pub fn gitlab_host(&self) -> &str {
        self.gitlab
            .as_ref()
            .map(|g| g.host.as_str())
            .unwrap_or(DEFAULT_GITLAB_HOST)
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `gitlab.host`, `server.read_only`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("gitlab", "host" | "url") => {
                self.gitlab = Some(GitLabConfig {
                    host: value.trim_end_matches('/').to_string(),
                });
            }
            ("server", "toolsets") => {
                self.server.toolsets = parse_toolset_list(value);
            }
            ("server", "read_only" | "read-only") => {
                self.server.read_only = parse_bool(value).ok_or_else(|| {
                    Error::Config(format!(
                        "Invalid value '{}' for server.read_only. Expected true or false",
                        value
                    ))
                })?;
            }
            ("gitlab" | "server", _) => {
                return Err(Error::Config(format!(
                    "Unknown {} config field: {}",
                    section, field
                )))
            }
            _ => {
                return Err(Error::Config(format!("Unknown config section: {}", section)));
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `gitlab.host`, `server.toolsets`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("gitlab", "host" | "url") => Ok(self.gitlab.as_ref().map(|g| g.host.clone())),
            ("server", "toolsets") => {
                if self.server.toolsets.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.server.toolsets.join(",")))
                }
            }
            ("server", "read_only" | "read-only") => Ok(Some(self.server.read_only.to_string())),
            ("gitlab" | "server", _) => Err(Error::Config(format!(
                "Unknown {} config field: {}",
                section, field
            ))),
            _ => Err(Error::Config(format!("Unknown config section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
