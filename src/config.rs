//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STATE_DIR_NAME: &str = ".jobboard";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL for every API call, without a trailing slash.
    pub api_base: String,
    /// Directory holding the durable key-value file.
    pub state_dir: PathBuf,
    pub timeouts: HttpTimeouts,
    /// Forwarded as `top_n_companies` on the statistics endpoint.
    pub stats_top_n: Option<u32>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `API_BASE`: default `http://localhost:8000`
    /// - `JOBBOARD_STATE_DIR`: default `$HOME/.jobboard`
    /// - `JOBBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `JOBBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `JOBBOARD_STATS_TOP_N`: server default when absent
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `API_BASE` is not an
    /// http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = normalize_base_url(
            std::env::var("API_BASE").ok().as_deref().unwrap_or(DEFAULT_API_BASE),
        )?;
        let state_dir = std::env::var("JOBBOARD_STATE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_state_dir, PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("JOBBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("JOBBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let stats_top_n = std::env::var("JOBBOARD_STATS_TOP_N")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0);

        Ok(Self { api_base, state_dir, timeouts, stats_top_n })
    }
}

/// Trim whitespace and trailing slashes, and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for empty input or another scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if host.is_empty() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn default_state_dir() -> PathBuf {
    std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .map_or_else(|| PathBuf::from(STATE_DIR_NAME), |home| PathBuf::from(home).join(STATE_DIR_NAME))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
