//! Application configuration management.
//!
//! Settings come from environment variables (a `.env` file is loaded by the
//! binary before this runs). Everything has a default except the sheet id
//! and one form of Google credentials.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Cache TTL when `CACHE_TTL_SECONDS` is unset
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme";
pub const DEFAULT_APP_TITLE: &str = "PlayoffPurge 2025";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "No Google credentials configured: set GOOGLE_APPLICATION_CREDENTIALS, \
         GOOGLE_APPLICATION_CREDENTIALS_JSON or GOOGLE_API_KEY"
    )]
    NoCredentials,
}

/// How requests to the Sheets API are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service-account key JSON supplied inline (container deployments).
    ServiceAccountJson(String),
    /// Path to a service-account key file (local development).
    ServiceAccountFile(PathBuf),
    /// API key; only works for sheets shared publicly.
    ApiKey(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccountJson(_) => f.write_str("ServiceAccountJson(<redacted>)"),
            Credentials::ServiceAccountFile(path) => {
                f.debug_tuple("ServiceAccountFile").field(path).finish()
            }
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub sheet_id: String,
    pub credentials: Credentials,
    pub cache_ttl: Duration,
    pub admin_username: String,
    pub admin_password: String,
    pub app_title: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sheet_id", &self.sheet_id)
            .field("credentials", &self.credentials)
            .field("cache_ttl", &self.cache_ttl)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("app_title", &self.app_title)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sheet_id = get("GOOGLE_SHEET_ID").ok_or(ConfigError::Missing("GOOGLE_SHEET_ID"))?;

        // Inline JSON wins over a file path, which wins over an API key
        let credentials = if let Some(json) = get("GOOGLE_APPLICATION_CREDENTIALS_JSON") {
            Credentials::ServiceAccountJson(json)
        } else if let Some(path) = get("GOOGLE_APPLICATION_CREDENTIALS") {
            Credentials::ServiceAccountFile(PathBuf::from(path))
        } else if let Some(key) = get("GOOGLE_API_KEY") {
            Credentials::ApiKey(key)
        } else {
            return Err(ConfigError::NoCredentials);
        };

        let cache_ttl_secs = match get("CACHE_TTL_SECONDS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "CACHE_TTL_SECONDS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            sheet_id,
            credentials,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            admin_username: get("ADMIN_USERNAME").unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: get("ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            app_title: get("APP_TITLE").unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
