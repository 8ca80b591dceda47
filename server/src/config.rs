//! Configuration loading from environment variables.
//!
//! A `.env` file in the working directory is read first if present; real
//! environment variables take precedence over it.
//!
//! | variable                   | default                                                    |
//! |----------------------------|------------------------------------------------------------|
//! | `TODO_BIND`                | `0.0.0.0:8080`                                             |
//! | `DATABASE_URL`             | `postgres://postgres:postgres@db:5432/mydb?sslmode=disable` |
//! | `DATABASE_MAX_CONNECTIONS` | `10`                                                       |
//! | `DATABASE_ACQUIRE_TIMEOUT` | `5` (seconds)                                              |
//! | `LOG_FORMAT`               | `pretty` (or `json`)                                       |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres:postgres@db:5432/mydb?sslmode=disable";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for environment variable '{key}'")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind: SocketAddr = parsed_or(&lookup, "TODO_BIND", DEFAULT_BIND.parse().ok())?;
        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parsed_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            Some(DEFAULT_MAX_CONNECTIONS),
        )?;
        let acquire_timeout_secs: u64 = parsed_or(
            &lookup,
            "DATABASE_ACQUIRE_TIMEOUT",
            Some(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )?;
        let log_format = parsed_or(&lookup, "LOG_FORMAT", Some(LogFormat::default()))?;

        Ok(Self {
            bind,
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            log_format,
        })
    }
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let invalid = |value: String| ConfigError::Invalid {
        key: key.to_string(),
        value,
    };
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| invalid(value)),
        None => default.ok_or_else(|| invalid(String::new())),
    }
}
