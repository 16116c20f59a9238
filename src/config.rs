//! Environment-driven configuration
//!
//! All settings come from `PADDOCK_*` environment variables (a `.env` file
//! is honored). Only the Data API credentials are required; everything else
//! has a default suitable for a small league install.

use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_API_BASE_URL: &str = "https://members-ng.iracing.com";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 6 * 3600;
const DEFAULT_MAX_STAT_AGE_DAYS: i64 = 7;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Base URL of the sim platform's Data API
    pub api_base_url: Url,
    /// Data API account email
    pub api_email: String,
    /// Data API account password
    pub api_password: String,
    /// Delay between scheduled refresh cycles
    pub refresh_interval: Duration,
    /// Age at which cached week stats are considered stale
    pub max_stat_age: chrono::Duration,
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("PADDOCK_DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
            .into();

        let base_url_raw = std::env::var("PADDOCK_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&base_url_raw)
            .map_err(|e| AppError::Config(format!("Invalid PADDOCK_API_BASE_URL: {}", e)))?;

        let api_email = require_var("PADDOCK_API_EMAIL")?;
        let api_password = require_var("PADDOCK_API_PASSWORD")?;

        let refresh_interval_secs = parse_u64(
            std::env::var("PADDOCK_REFRESH_INTERVAL_SECS").ok(),
            DEFAULT_REFRESH_INTERVAL_SECS,
            "PADDOCK_REFRESH_INTERVAL_SECS",
        )?;

        let max_stat_age_days = parse_i64(
            std::env::var("PADDOCK_MAX_STAT_AGE_DAYS").ok(),
            DEFAULT_MAX_STAT_AGE_DAYS,
            "PADDOCK_MAX_STAT_AGE_DAYS",
        )?;
        if max_stat_age_days <= 0 {
            return Err(AppError::Config(
                "PADDOCK_MAX_STAT_AGE_DAYS must be positive".to_string(),
            ));
        }

        Ok(Self {
            data_dir,
            api_base_url,
            api_email,
            api_password,
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            max_stat_age: chrono::Duration::days(max_stat_age_days),
        })
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("paddock.db")
    }
}

fn require_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} not set", key))),
    }
}

fn parse_u64(raw: Option<String>, default: u64, key: &str) -> Result<u64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be an integer, got '{}'", key, value))),
    }
}

fn parse_i64(raw: Option<String>, default: i64, key: &str) -> Result<i64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be an integer, got '{}'", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_default() {
        assert_eq!(parse_u64(None, 21600, "X").unwrap(), 21600);
    }

    #[test]
    fn test_parse_u64_value() {
        assert_eq!(parse_u64(Some("900".into()), 21600, "X").unwrap(), 900);
    }

    #[test]
    fn test_parse_u64_trims_whitespace() {
        assert_eq!(parse_u64(Some(" 900 ".into()), 21600, "X").unwrap(), 900);
    }

    #[test]
    fn test_parse_u64_rejects_garbage() {
        let err = parse_u64(Some("soon".into()), 21600, "PADDOCK_REFRESH_INTERVAL_SECS");
        assert!(err.is_err());
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("PADDOCK_REFRESH_INTERVAL_SECS"));
        assert!(msg.contains("soon"));
    }

    #[test]
    fn test_parse_i64_negative_allowed_by_parser() {
        // Sign handling happens in from_env, the parser itself accepts it
        assert_eq!(parse_i64(Some("-3".into()), 7, "X").unwrap(), -3);
    }
}
