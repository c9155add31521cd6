//! Bounded-timeout HTTP client settings for collaborator calls.
//!
//! Every external call in this system goes through a `reqwest::Client`
//! built from an explicit [`HttpClientConfig`] handed to the caller at
//! construction time. Timeouts are fixed per collaborator and read from
//! the environment once, at startup.

use crate::config::{env_duration_ms, env_or};
use crate::error::AppError;
use reqwest::Client;
use std::time::Duration;

/// Connection settings for one collaborator service.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpClientConfig {
    /// Read `{PREFIX}_SERVICE_URL`, `{PREFIX}_CONNECT_TIMEOUT_MS` and
    /// `{PREFIX}_REQUEST_TIMEOUT_MS`, with the given fallbacks.
    pub fn from_env(prefix: &str, default_base_url: &str, default_request_ms: u64) -> Self {
        Self {
            base_url: env_or(&format!("{}_SERVICE_URL", prefix), default_base_url),
            connect_timeout: env_duration_ms(&format!("{}_CONNECT_TIMEOUT_MS", prefix), 2000),
            request_timeout: env_duration_ms(
                &format!("{}_REQUEST_TIMEOUT_MS", prefix),
                default_request_ms,
            ),
        }
    }

    /// Build a client enforcing the configured timeouts on every request.
    pub fn build_client(&self) -> Result<Client, AppError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
