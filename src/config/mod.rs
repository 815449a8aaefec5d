//! Configuration module for the leads console.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key the dashboard must present to the console (disabled when unset)
    pub api_psk: Option<String>,
    /// Base URL of the upstream REST API, without trailing slash
    pub upstream_url: String,
    /// Bearer token forwarded to the upstream API
    pub upstream_token: Option<String>,
    /// Per-request timeout for upstream calls
    pub upstream_timeout: Duration,
    /// JSON file holding the last known admin account
    pub session_cache: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("LEADS_API_PSK").ok().filter(|k| !k.is_empty());

        let upstream_url = env::var("LEADS_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let upstream_token = env::var("LEADS_UPSTREAM_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let timeout_secs = match env::var("LEADS_UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Internal(format!("Invalid LEADS_UPSTREAM_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => 30,
        };

        let session_cache = env::var("LEADS_SESSION_CACHE")
            .unwrap_or_else(|_| "./data/session.json".to_string())
            .into();

        let raw_addr = env::var("LEADS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| AppError::Internal(format!("Invalid LEADS_BIND_ADDR: {}", raw_addr)))?;

        let log_level = env::var("LEADS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_psk,
            upstream_url,
            upstream_token,
            upstream_timeout: Duration::from_secs(timeout_secs),
            session_cache,
            bind_addr,
            log_level,
        })
    }
}
