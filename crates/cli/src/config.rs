// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is read from TOML and includes:
//! - `[api]`: REST base URL and request timeout
//! - `[push]`: push channel URL and reconnection policy
//!
//! Lookup order is `--config`, then `$HEYAMA_CONFIG`, then
//! `<config_dir>/heyama/config.toml` when it exists. `$HEYAMA_API_URL`
//! overrides both URLs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::push::PushConfig;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://nestjs-heyama-api-test.onrender.com";

const CONFIG_DIR_NAME: &str = "heyama";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub push: PushSettings,
}

/// REST client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the backend (`http://` or `https://`).
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Push channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    /// Base URL of the push service, usually the same as the REST one.
    pub url: String,
    /// Connection attempts before giving up (default: 5).
    pub reconnect_attempts: u32,
    /// Delay before the first reconnection attempt in milliseconds (default: 1000).
    pub reconnect_delay_ms: u64,
    /// Maximum delay between attempts in milliseconds (default: 5000).
    pub reconnect_delay_max_ms: u64,
    /// Limit on one connect-and-handshake attempt in milliseconds (default: 20000).
    pub connect_timeout_ms: u64,
}

impl Default for PushSettings {
    fn default() -> Self {
        PushSettings {
            url: DEFAULT_BASE_URL.to_string(),
            reconnect_attempts: 5,
            reconnect_delay_ms: 1_000,
            reconnect_delay_max_ms: 5_000,
            connect_timeout_ms: 20_000,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses TOML. Missing fields take their defaults.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Finds, loads and validates the configuration.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_from(
            explicit.map(Path::to_path_buf).or_else(env::config_path),
            Self::default_path(),
            env::api_url(),
        )
    }

    pub(crate) fn resolve_from(
        path: Option<PathBuf>,
        default_path: Option<PathBuf>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let mut config = match (path, default_path) {
            (Some(path), _) => Self::load(&path)?,
            (None, Some(path)) if path.is_file() => Self::load(&path)?,
            _ => Self::default(),
        };
        if let Some(url) = api_url {
            tracing::debug!("using api url from environment: {}", url);
            config.apply_api_url(&url);
        }
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/heyama/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Points both the REST client and the push channel at `url`.
    pub fn apply_api_url(&mut self, url: &str) {
        let url = url.trim_end_matches('/').to_string();
        self.api.base_url = url.clone();
        self.push.url = url;
    }

    /// Checks URLs and limits.
    pub fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("push.url", &self.push.url)?;
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be positive".to_string()));
        }
        if self.push.connect_timeout_ms == 0 {
            return Err(Error::Config(
                "push.connect_timeout_ms must be positive".to_string(),
            ));
        }
        if self.push.reconnect_attempts == 0 {
            return Err(Error::Config(
                "push.reconnect_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Push channel settings in the form the channel takes.
    pub fn push_config(&self) -> PushConfig {
        PushConfig {
            url: self.push.url.clone(),
            reconnect_attempts: self.push.reconnect_attempts,
            reconnect_delay: Duration::from_millis(self.push.reconnect_delay_ms),
            reconnect_delay_max: Duration::from_millis(self.push.reconnect_delay_max_ms),
            connect_timeout: Duration::from_millis(self.push.connect_timeout_ms),
        }
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(Error::Config(format!(
            "invalid {} '{}': must start with http:// or https://",
            field, url
        ))),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
