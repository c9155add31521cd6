//! Configuration module for delivery-service.

use service_core::config as core_config;
use service_core::config::env_or;
use service_core::error::AppError;
use service_core::http::HttpClientConfig;
use std::env;

/// Service-level configuration, assembled from environment variables.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    /// Sales collaborator, queried for the sale summary behind a delivery.
    pub sales: HttpClientConfig,
    /// Users collaborator, queried for the client behind a sale.
    pub users: HttpClientConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// When unset the service runs against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DeliveryConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env_or("SERVICE_NAME", "delivery-service"),
            log_level: env_or("LOG_LEVEL", "info"),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            // enrichment lookups sit on the interactive read path and must
            // give up fast
            sales: HttpClientConfig::from_env("SALES", "http://sales-service:3000", 2000),
            users: HttpClientConfig::from_env("USERS", "http://users-service:3003", 2000),
        })
    }
}
