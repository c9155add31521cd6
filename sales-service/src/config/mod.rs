//! Configuration module for sales-service.

use service_core::config as core_config;
use service_core::config::{env_duration_ms, env_or};
use service_core::error::AppError;
use service_core::http::HttpClientConfig;
use std::env;
use std::time::Duration;

/// Service-level configuration, assembled from environment variables.
#[derive(Debug, Clone)]
pub struct SalesConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub inventory: InventoryServiceConfig,
    pub delivery: HttpClientConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// When unset the service runs against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Inventory collaborator settings. On top of the shared connect and request
/// timeouts, every stock-adjustment call carries an overall deadline covering
/// the complete exchange.
#[derive(Debug, Clone)]
pub struct InventoryServiceConfig {
    pub http: HttpClientConfig,
    pub call_deadline: Duration,
}

impl SalesConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env_or("SERVICE_NAME", "sales-service"),
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
            inventory: InventoryServiceConfig {
                http: HttpClientConfig::from_env(
                    "INVENTORY",
                    "http://inventory-service:3001",
                    6000,
                ),
                call_deadline: env_duration_ms("INVENTORY_CALL_DEADLINE_MS", 7000),
            },
            delivery: HttpClientConfig::from_env("DELIVERY", "http://delivery-service:3002", 5000),
        })
    }
}
