//! Configuration module for the web gateway.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the course backend REST API
    pub backend_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Shared secret for the legacy admin view (disabled when unset)
    pub admin_secret: Option<String>,
    /// Public key handed to the payment widget
    pub payment_public_key: Option<String>,
    /// Analytics tag id exposed to the pages
    pub analytics_id: Option<String>,
    /// Quiet window before a live search hits the backend
    pub search_debounce: Duration,
    /// Timeout applied to every backend call
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let backend_url = env::var("MODISTA_BACKEND_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:4000".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("MODISTA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid MODISTA_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("MODISTA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let search_debounce =
            Duration::from_millis(parse_number("MODISTA_SEARCH_DEBOUNCE_MS", 500)?);
        let request_timeout =
            Duration::from_secs(parse_number("MODISTA_REQUEST_TIMEOUT_SECS", 15)?);

        Ok(Self {
            backend_url,
            bind_addr,
            log_level,
            admin_secret: non_empty_var("MODISTA_ADMIN_SECRET"),
            payment_public_key: non_empty_var("MODISTA_PAYMENT_PUBLIC_KEY"),
            analytics_id: non_empty_var("MODISTA_ANALYTICS_ID"),
            search_debounce,
            request_timeout,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("Invalid {} value: {:?}", name, raw))),
        Err(_) => Ok(default),
    }
}
