//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub cors_origin: String,
    pub judge0_api_url: String,
    pub judge0_api_host: String,
    pub judge0_api_key: String,
    pub execution_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", &or_default("BIND_ADDRESS", "0.0.0.0:3000"))?;
        let database_url = or_default("DATABASE_URL", "sqlite://codelab.db");
        let database_max_connections =
            parse_var("DATABASE_MAX_CONNECTIONS", &or_default("DATABASE_MAX_CONNECTIONS", "5"))?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = or_default("CORS_ORIGIN", "http://localhost:3000");

        // --- Code Execution Provider ---
        let judge0_api_url = or_default("JUDGE0_API_URL", "https://judge0-ce.p.rapidapi.com");
        let judge0_api_host = or_default("JUDGE0_API_HOST", "judge0-ce.p.rapidapi.com");
        let judge0_api_key = or_default("JUDGE0_API_KEY", "test");
        let timeout_secs: u64 =
            parse_var("EXECUTION_TIMEOUT_SECS", &or_default("EXECUTION_TIMEOUT_SECS", "30"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "EXECUTION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            cors_origin,
            judge0_api_url: judge0_api_url.trim_end_matches('/').to_string(),
            judge0_api_host,
            judge0_api_key,
            execution_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://codelab.db");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.judge0_api_url, "https://judge0-ce.p.rapidapi.com");
        assert_eq!(config.judge0_api_key, "test");
        assert_eq!(config.execution_timeout, Duration::from_secs(30));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = load(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("RUST_LOG", "debug"),
            ("JUDGE0_API_URL", "http://localhost:2358/"),
            ("EXECUTION_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.judge0_api_url, "http://localhost:2358");
        assert_eq!(config.execution_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("BIND_ADDRESS", "not-an-address")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "BIND_ADDRESS"));

        let err = load(&[("RUST_LOG", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "RUST_LOG"));

        let err = load(&[("EXECUTION_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "EXECUTION_TIMEOUT_SECS"));
    }
}
