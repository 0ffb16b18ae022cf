//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (database commands only)
//! - `INVOICER_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 1, seeding is sequential)
//! - `DATABASE_ACQUIRE_TIMEOUT_SECS` - Connection acquire timeout (default: 10)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `RUST_LOG` - Tracing filter (default: `invoicer_cli=info`)
//!
//! The binary loads a `.env` file from the working directory before any of
//! these are read.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DATABASE_URL_KEY: &str = "INVOICER_DATABASE_URL";
const DEFAULT_MAX_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub url: SecretString,
    /// Maximum pool size
    pub max_connections: u32,
    /// How long to wait for a connection before giving up
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Load database settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no database URL is set or a numeric setting
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load database settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`DatabaseConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(DATABASE_URL_KEY)
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(DATABASE_URL_KEY.to_string()))?;

        let max_connections = parse_positive(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let acquire_timeout_secs = parse_positive(
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            lookup("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`, defaulting to [`LogFormat::Pretty`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unrecognised values.
    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var("LOG_FORMAT")
            .ok()
            .map_or(Ok(Self::default()), |value| value.parse())
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidEnvVar(
                "LOG_FORMAT".to_string(),
                format!("expected 'pretty' or 'json', got '{other}'"),
            )),
        }
    }
}

/// Parse an optional positive integer setting.
fn parse_positive<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = value else {
        return Ok(default);
    };
    let parsed = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if parsed <= T::default() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_url() {
        let err = DatabaseConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "INVOICER_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/generic")]))
                .unwrap();
        assert_eq!(config.url.expose_secret(), "postgres://localhost/generic");
    }

    #[test]
    fn test_primary_url_wins() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/generic"),
            ("INVOICER_DATABASE_URL", "postgres://localhost/invoicer"),
        ]))
        .unwrap();
        assert_eq!(config.url.expose_secret(), "postgres://localhost/invoicer");
    }

    #[test]
    fn test_defaults() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_pool_size() {
        for bad in ["zero", "0", "-2"] {
            let result = DatabaseConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://x"),
                ("DATABASE_MAX_CONNECTIONS", bad),
            ]));
            assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))), "{bad}");
        }
    }

    #[test]
    fn test_debug_redacts_url() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://u:hunter2@db")]))
                .unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
