// src/config/mod.rs
// Runtime configuration, loaded from the environment (and .env) with typed defaults

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, Serialize)]
pub struct StockroomConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub request_timeout_secs: u64,

    // ── Database
    pub database_url: String,
    pub db_max_connections: u32,

    // ── Upstream APIs
    pub exchange_rate_url: String,
    pub weather_url: String,
    pub upstream_timeout_secs: u64,

    // ── Logging
    pub log_level: String,
}

/// Drop a trailing `# comment`. The `#` must start the value or follow whitespace,
/// so URL fragments and paths containing `#` survive.
fn strip_inline_comment(val: &str) -> &str {
    let mut prev_is_space = true;
    for (i, c) in val.char_indices() {
        if c == '#' && prev_is_space {
            return &val[..i];
        }
        prev_is_space = c.is_whitespace();
    }
    val
}

/// Parse `key` from `lookup`, falling back to `default` when missing or unparsable.
/// Trailing `# comments` and surrounding whitespace are stripped before parsing.
fn env_var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = strip_inline_comment(&val).trim();
            if clean_val.is_empty() {
                return default;
            }
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

impl StockroomConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: env_var_or(&lookup, "STOCKROOM_HOST", "127.0.0.1".to_string()),
            port: env_var_or(&lookup, "STOCKROOM_PORT", 8080),
            cors_origin: env_var_or(&lookup, "STOCKROOM_CORS_ORIGIN", "*".to_string()),
            request_timeout_secs: env_var_or(&lookup, "STOCKROOM_REQUEST_TIMEOUT_SECS", 30),
            database_url: env_var_or(
                &lookup,
                "DATABASE_URL",
                "sqlite://stockroom.db?mode=rwc".to_string(),
            ),
            db_max_connections: env_var_or(&lookup, "STOCKROOM_DB_MAX_CONNECTIONS", 5),
            exchange_rate_url: env_var_or(
                &lookup,
                "EXCHANGE_RATE_URL",
                DEFAULT_EXCHANGE_RATE_URL.to_string(),
            ),
            weather_url: env_var_or(&lookup, "WEATHER_URL", DEFAULT_WEATHER_URL.to_string()),
            upstream_timeout_secs: env_var_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 10),
            log_level: env_var_or(&lookup, "STOCKROOM_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("STOCKROOM_PORT must be non-zero");
        }
        if self.db_max_connections == 0 {
            bail!("STOCKROOM_DB_MAX_CONNECTIONS must be at least 1");
        }
        url::Url::parse(&self.exchange_rate_url)
            .with_context(|| format!("invalid EXCHANGE_RATE_URL: {}", self.exchange_rate_url))?;
        url::Url::parse(&self.weather_url)
            .with_context(|| format!("invalid WEATHER_URL: {}", self.weather_url))?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StockroomConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.exchange_rate_url, DEFAULT_EXCHANGE_RATE_URL);
        assert_eq!(config.weather_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_and_comment_stripping() {
        let config = StockroomConfig::from_lookup(lookup_from(&[
            ("STOCKROOM_PORT", "9090 # local dev"),
            ("UPSTREAM_TIMEOUT_SECS", " 3 "),
            ("WEATHER_URL", "http://127.0.0.1:1/forecast"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(3));
        assert_eq!(config.weather_url, "http://127.0.0.1:1/forecast");
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let config = StockroomConfig::from_lookup(lookup_from(&[("STOCKROOM_PORT", "eighty")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = StockroomConfig::from_lookup(lookup_from(&[("EXCHANGE_RATE_URL", "not a url")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("EXCHANGE_RATE_URL"));
    }

    #[test]
    fn test_hash_inside_url_is_kept() {
        let config = StockroomConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite:///srv/stock#1/db.sqlite # prod"),
            ("WEATHER_URL", "http://127.0.0.1:1/forecast#current"),
            ("STOCKROOM_LOG_LEVEL", "# unset"),
        ]));
        assert_eq!(config.database_url, "sqlite:///srv/stock#1/db.sqlite");
        assert_eq!(config.weather_url, "http://127.0.0.1:1/forecast#current");
        assert_eq!(config.log_level, "info");
    }
}
