//! Client configuration parsed from environment variables.
//!
//! One strategy for every endpoint: the backend base URL comes from
//! `BOOKSHARE_API_URL` and all request paths are joined onto it.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Name of the durable slot holding the raw credential.
pub const TOKEN_KEY: &str = "bookshare_token";

const API_URL_VAR: &str = "BOOKSHARE_API_URL";
const TOKEN_PATH_VAR: &str = "BOOKSHARE_TOKEN_PATH";
const REQUEST_TIMEOUT_VAR: &str = "BOOKSHARE_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "BOOKSHARE_CONNECT_TIMEOUT_SECS";

/// Optional HTTP timeouts. `None` means the call may wait indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

/// Explicit values (command-line flags) that replace their environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// File backing the credential slot.
    pub token_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BOOKSHARE_API_URL`: default `http://127.0.0.1:5000`
    /// - `BOOKSHARE_TOKEN_PATH`: default `<data dir>/bookshare/bookshare_token`
    /// - `BOOKSHARE_REQUEST_TIMEOUT_SECS`: unset or `0` disables the timeout
    /// - `BOOKSHARE_CONNECT_TIMEOUT_SECS`: unset or `0` disables the timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed or no data directory
    /// exists for the default credential path.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_api_url(lookup(API_URL_VAR).as_deref().unwrap_or(DEFAULT_API_URL))?;
        let token_path = match lookup(TOKEN_PATH_VAR) {
            Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
            _ => default_token_path()?,
        };
        let timeouts = Timeouts {
            request: parse_secs(REQUEST_TIMEOUT_VAR, lookup(REQUEST_TIMEOUT_VAR).as_deref())?,
            connect: parse_secs(CONNECT_TIMEOUT_VAR, lookup(CONNECT_TIMEOUT_VAR).as_deref())?,
        };

        Ok(Self { api_url, token_path, timeouts })
    }

    /// Build config from environment variables, letting `overrides` win.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`], but a malformed variable that an
    /// override replaces is never parsed.
    pub fn from_env_with(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Build config from `lookup`, letting `overrides` win.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_lookup`].
    pub fn from_lookup_with<F>(lookup: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| match key {
            API_URL_VAR if overrides.api_url.is_some() => overrides.api_url.clone(),
            TOKEN_PATH_VAR if overrides.token_path.is_some() => overrides
                .token_path
                .as_ref()
                .map(|path| path.display().to_string()),
            _ => lookup(key),
        })
    }

    /// Build the shared HTTP client honoring the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if reqwest rejects the settings.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeouts.request {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.timeouts.connect {
            builder = builder.connect_timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))
    }
}

/// Default credential slot under the platform data directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoDataDir`] when the platform exposes no data directory.
pub fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("bookshare").join(TOKEN_KEY))
        .ok_or(ConfigError::NoDataDir)
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| ConfigError::Invalid { var: API_URL_VAR, reason: format!("expected http(s) URL, got '{raw}'") })?;
    if host.is_empty() {
        return Err(ConfigError::Invalid { var: API_URL_VAR, reason: "missing host".into() });
    }
    Ok(trimmed.to_owned())
}

fn parse_secs(var: &'static str, raw: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let secs = raw
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid { var, reason: format!("expected whole seconds, got '{raw}'") })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
