//! Environment configuration for the `survey` binary.
//!
//! Environment variables:
//!   DATABASE_URL                   - PostgreSQL connection string
//!   SURVEY_DB_MAX_CONNECTIONS      - pool size (default: 10)
//!   SURVEY_DB_CONNECT_TIMEOUT_SECS - acquire timeout (default: 30)
//!
//! The suggestion backend reads its own `OPENAI_*` variables.

use std::str::FromStr;
use std::time::Duration;

use survey_core::defaults::{DB_CONNECT_TIMEOUT_SECS, DB_MAX_CONNECTIONS};
use survey_core::{Error, Result};
use survey_db::PoolConfig;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/survey";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub pool: PoolConfig,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a positive number, got \"{}\"", key, raw))),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections: u32 =
            parse_var(&lookup, "SURVEY_DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(Error::Config(
                "SURVEY_DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        let connect_timeout: u64 =
            parse_var(&lookup, "SURVEY_DB_CONNECT_TIMEOUT_SECS", DB_CONNECT_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            pool: PoolConfig::new()
                .max_connections(max_connections)
                .connect_timeout(Duration::from_secs(connect_timeout)),
        })
    }
}
