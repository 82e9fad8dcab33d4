//! # Configuration
//!
//! Settings resolve in layers: defaults → TOML file → environment (`.env` included) → CLI
//! flags. The binary applies the last layer; everything else lives here.
//!
//! ```toml
//! [client]
//! endpoint = "https://cloud.appwrite.io/v1"
//! project_id = "my-project"
//!
//! [fixtures]
//! database_id = "..."
//! collection_id = "..."
//! bucket_id = "..."
//! function_id = "..."
//!
//! [oauth]
//! success_url = "http://localhost:8000"
//! failure_url = "http://localhost:8000"
//!
//! [log]
//! max_entries = 500
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;
pub const DEFAULT_MAX_REALTIME_EVENTS: usize = 20;
pub const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:8000";

pub const ENV_ENDPOINT: &str = "APPWRITE_ENDPOINT";
pub const ENV_PROJECT_ID: &str = "APPWRITE_PROJECT_ID";
pub const ENV_DEV_KEY: &str = "APPWRITE_DEV_KEY";
pub const ENV_REALTIME_ENDPOINT: &str = "APPWRITE_REALTIME_ENDPOINT";
pub const ENV_DATABASE_ID: &str = "APPWRITE_DATABASE_ID";
pub const ENV_COLLECTION_ID: &str = "APPWRITE_COLLECTION_ID";
pub const ENV_BUCKET_ID: &str = "APPWRITE_BUCKET_ID";
pub const ENV_FUNCTION_ID: &str = "APPWRITE_FUNCTION_ID";
pub const ENV_OAUTH_SUCCESS_URL: &str = "APPWRITE_OAUTH_SUCCESS_URL";
pub const ENV_OAUTH_FAILURE_URL: &str = "APPWRITE_OAUTH_FAILURE_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("endpoint `{endpoint}` is invalid: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Connection settings consumed once by `Session::initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub project_id: String,
    pub dev_key: Option<String>,
    /// Overrides the `ws(s)://` endpoint derived from `endpoint`.
    pub realtime_endpoint: Option<String>,
    pub locale: Option<String>,
    /// Accept self-signed TLS certificates (local Appwrite instances).
    pub self_signed: bool,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_dev_key(mut self, key: impl Into<String>) -> Self {
        self.dev_key = Some(key.into());
        self
    }

    pub fn with_realtime_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.realtime_endpoint = Some(endpoint.into());
        self
    }

    /// Checks the fields every service handle needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Missing("endpoint"));
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Missing("project_id"));
        }
        let url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("scheme must be http or https, got `{}`", url.scheme()),
            });
        }
        if let Some(realtime) = self.realtime_endpoint.as_deref().filter(|r| !r.trim().is_empty()) {
            let url = Url::parse(realtime).map_err(|e| ConfigError::InvalidEndpoint {
                endpoint: realtime.to_string(),
                reason: e.to_string(),
            })?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(ConfigError::InvalidEndpoint {
                    endpoint: realtime.to_string(),
                    reason: format!("scheme must be ws or wss, got `{}`", url.scheme()),
                });
            }
        }
        Ok(())
    }
}

/// Ids of the project resources the playground actions operate on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
    pub bucket_id: Option<String>,
    pub function_id: Option<String>,
}

/// Where the provider sends the browser after an OAuth2 login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            success_url: Some(DEFAULT_OAUTH_REDIRECT.to_string()),
            failure_url: Some(DEFAULT_OAUTH_REDIRECT.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub max_entries: usize,
    pub max_realtime_events: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_LOG_ENTRIES,
            max_realtime_events: DEFAULT_MAX_REALTIME_EVENTS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub client: ClientConfig,
    pub fixtures: Fixtures,
    pub oauth: OAuthConfig,
    pub log: LogConfig,
}

impl PlaygroundConfig {
    /// Reads a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text)?;
        tracing::info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlays values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlays values from `lookup`; empty values are ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_ENDPOINT) {
            self.client.endpoint = v;
        }
        if let Some(v) = get(ENV_PROJECT_ID) {
            self.client.project_id = v;
        }
        if let Some(v) = get(ENV_DEV_KEY) {
            self.client.dev_key = Some(v);
        }
        if let Some(v) = get(ENV_REALTIME_ENDPOINT) {
            self.client.realtime_endpoint = Some(v);
        }
        if let Some(v) = get(ENV_DATABASE_ID) {
            self.fixtures.database_id = Some(v);
        }
        if let Some(v) = get(ENV_COLLECTION_ID) {
            self.fixtures.collection_id = Some(v);
        }
        if let Some(v) = get(ENV_BUCKET_ID) {
            self.fixtures.bucket_id = Some(v);
        }
        if let Some(v) = get(ENV_FUNCTION_ID) {
            self.fixtures.function_id = Some(v);
        }
        if let Some(v) = get(ENV_OAUTH_SUCCESS_URL) {
            self.oauth.success_url = Some(v);
        }
        if let Some(v) = get(ENV_OAUTH_FAILURE_URL) {
            self.oauth.failure_url = Some(v);
        }
    }

    /// Fills in the default endpoint when nothing else provided one.
    pub fn with_defaults(mut self) -> Self {
        if self.client.endpoint.trim().is_empty() {
            self.client.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        self
    }
}
