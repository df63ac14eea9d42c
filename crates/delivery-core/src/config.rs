//! Configuration module
//!
//! Client settings are read from `DELIVERY_*` environment variables (a `.env`
//! file is honoured). Every setting has a default so the client runs with no
//! configuration against a local server.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ClientError;
use crate::lifecycle::{LifecyclePolicy, EXPIRY_WINDOW_DAYS};

const ENV_PREFIX: &str = "DELIVERY_";
const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_FILE: &str = ".delivery-session.json";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

fn default_expiry_window_days() -> i64 {
    EXPIRY_WINDOW_DAYS
}

fn default_true() -> bool {
    true
}

/// Client configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the delivery API, e.g. `https://host/api`
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Where signed-in credentials are kept between runs
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_expiry_window_days")]
    pub expiry_window_days: i64,
    #[serde(default = "default_true")]
    pub block_lone_active_renewal: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            http_timeout_secs: default_http_timeout_secs(),
            session_file: default_session_file(),
            expiry_window_days: default_expiry_window_days(),
            block_lone_active_renewal: true,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment (after reading `.env` if present).
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        let config: ClientConfig = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        tracing::debug!(api_url = %config.api_url, "loaded client configuration");
        Ok(config)
    }

    /// Load from explicit key/value pairs (keys carry the `DELIVERY_` prefix).
    pub fn from_vars<I>(vars: I) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: ClientConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("DELIVERY_API_URL must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "DELIVERY_API_URL must start with http:// or https://, got {}",
                url
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ClientError::Config(
                "DELIVERY_HTTP_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        if self.expiry_window_days < 0 {
            return Err(ClientError::Config(
                "DELIVERY_EXPIRY_WINDOW_DAYS must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn lifecycle_policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            expiry_window_days: self.expiry_window_days,
            block_lone_active: self.block_lone_active_renewal,
        }
    }
}
