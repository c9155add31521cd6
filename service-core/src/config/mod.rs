use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Read an environment variable, falling back to a default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a millisecond duration from the environment, falling back to a default.
pub fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("CORE_CONFIG_TEST_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn env_duration_ms_parses_and_defaults() {
        std::env::set_var("CORE_CONFIG_TEST_TIMEOUT_MS", "250");
        assert_eq!(
            env_duration_ms("CORE_CONFIG_TEST_TIMEOUT_MS", 1000),
            Duration::from_millis(250)
        );
        assert_eq!(
            env_duration_ms("CORE_CONFIG_TEST_TIMEOUT_MS_UNSET", 1000),
            Duration::from_millis(1000)
        );

        std::env::set_var("CORE_CONFIG_TEST_TIMEOUT_BAD_MS", "not-a-number");
        assert_eq!(
            env_duration_ms("CORE_CONFIG_TEST_TIMEOUT_BAD_MS", 500),
            Duration::from_millis(500)
        );
    }
}
