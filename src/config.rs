//! Service configuration loaded from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

/// Runtime configuration
///
/// | Variable | Default |
/// |----------|---------|
/// | DATABASE_URL | required |
/// | HOST | 0.0.0.0 |
/// | PORT | 5000 |
/// | DB_MAX_CONNECTIONS | 10 |
/// | STORE_TIMEOUT_MS | 5000 |
/// | RATE_CACHE_TTL_SECS | 60 |
/// | RATE_CACHE_CAPACITY | 256 |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Upper bound for each catalog read and quotation write
    pub store_timeout: Duration,
    pub rate_cache_ttl: Duration,
    pub rate_cache_capacity: u64,
}

impl Config {
    /// Load from process environment (after `.env`, if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL is not defined in environment variables"))?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            store_timeout: Duration::from_millis(parse_or(&lookup, "STORE_TIMEOUT_MS", 5000)?),
            rate_cache_ttl: Duration::from_secs(parse_or(&lookup, "RATE_CACHE_TTL_SECS", 60)?),
            rate_cache_capacity: parse_or(&lookup, "RATE_CACHE_CAPACITY", 256)?,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/courts")]))
                .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.store_timeout, Duration::from_millis(5000));
        assert_eq!(config.rate_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.rate_cache_capacity, 256);
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/courts"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("STORE_TIMEOUT_MS", " 250 "),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/courts"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
