//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file in the working directory (or the file named by
//! `STOREFRONT_ENV_FILE`) is read first; variables already set in the
//! environment take precedence over it.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Local, Offset};
use storefront_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a checkout waits for a locked product before giving up
    pub lock_timeout: Duration,

    /// Re-runs of a checkout after a lock conflict
    pub checkout_max_retries: u32,

    /// Largest accepted request body in bytes (default: 1MB)
    pub body_limit_bytes: usize,

    /// Offset that decides where a reporting day starts and ends
    pub report_offset: FixedOffset,

    /// Insert the sample catalog on startup when empty
    pub seed_data: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "./storefront.db".to_string(),
            db_max_connections: 10,
            lock_timeout: Duration::from_millis(5_000),
            checkout_max_retries: 2,
            body_limit_bytes: crate::DEFAULT_BODY_LIMIT,
            report_offset: Local::now().offset().fix(),
            seed_data: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("STOREFRONT_ENV_FILE") {
            Ok(path) => Self::load_with_env_file(path),
            Err(_) => {
                // Load .env file if present
                dotenvy::dotenv().ok();
                Self::from_lookup(|key| env::var(key).ok())
            }
        }
    }

    /// Loads `path` into the environment, then reads the configuration.
    /// Unlike the implicit `.env`, a named file must exist.
    pub fn load_with_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path)
            .map_err(|e| ConfigError::EnvFile(format!("{}: {}", path.display(), e)))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let report_offset = match lookup("REPORT_UTC_OFFSET") {
            Some(value) => parse_offset(&value)
                .ok_or_else(|| ConfigError::InvalidValue("REPORT_UTC_OFFSET".to_string()))?,
            None => defaults.report_offset,
        };

        let config = ApiConfig {
            host: lookup("STOREFRONT_HOST").unwrap_or(defaults.host),
            port: parse_or("STOREFRONT_PORT", &lookup, defaults.port)?,
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                &lookup,
                defaults.db_max_connections,
            )?,
            lock_timeout: Duration::from_millis(parse_or(
                "DB_LOCK_TIMEOUT_MS",
                &lookup,
                defaults.lock_timeout.as_millis() as u64,
            )?),
            checkout_max_retries: parse_or(
                "CHECKOUT_MAX_RETRIES",
                &lookup,
                defaults.checkout_max_retries,
            )?,
            body_limit_bytes: parse_or("BODY_LIMIT_BYTES", &lookup, defaults.body_limit_bytes)?,
            report_offset,
            seed_data: lookup("SEED_DATA")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Returns the socket address string for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .lock_timeout(self.lock_timeout)
            .max_retries(self.checkout_max_retries)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Parses `+07:00`, `-05:30`, `+0700` or `Z`.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match *value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read env file {0}")]
    EnvFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.checkout_max_retries, 2);
        assert_eq!(config.lock_timeout, Duration::from_secs(5));
        assert!(!config.seed_data);
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("STOREFRONT_HOST", "127.0.0.1"),
            ("STOREFRONT_PORT", "8080"),
            ("DB_LOCK_TIMEOUT_MS", "250"),
            ("REPORT_UTC_OFFSET", "+07:00"),
            ("SEED_DATA", "true"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.report_offset.local_minus_utc(), 7 * 3600);
        assert!(config.seed_data);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[("STOREFRONT_PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for STOREFRONT_PORT");
    }

    #[test]
    fn test_zero_pool_rejected() {
        assert!(ApiConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "0")])).is_err());
    }

    #[test]
    fn test_env_file_values_are_loaded() {
        let path = env::temp_dir().join(format!("storefront-api-{}.env", std::process::id()));
        std::fs::write(
            &path,
            "STOREFRONT_PORT=4123\nREPORT_UTC_OFFSET=+07:00\nSEED_DATA=true\n",
        )
        .unwrap();

        let config = ApiConfig::load_with_env_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.port, 4123);
        assert_eq!(config.report_offset.local_minus_utc(), 7 * 3600);
        assert!(config.seed_data);
    }

    #[test]
    fn test_missing_env_file_rejected() {
        let err = ApiConfig::load_with_env_file("/nonexistent/storefront.env").unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+07:00").unwrap().local_minus_utc(), 25_200);
        assert_eq!(parse_offset("-0530").unwrap().local_minus_utc(), -19_800);
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("07:00").is_none());
        assert!(parse_offset("+07:75").is_none());
        assert!(parse_offset("+7").is_none());
    }
}
