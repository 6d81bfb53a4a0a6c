//! Startup configuration, read once from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use wms_core::query::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use wms_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Postgres store when set; in-memory store otherwise.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub default_page_limit: u32,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_page_limit = parse(&lookup, "WMS_DEFAULT_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        if default_page_limit == 0 || default_page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::Invalid {
                key: "WMS_DEFAULT_PAGE_LIMIT",
                message: format!("must be between 1 and {MAX_PAGE_LIMIT}"),
            });
        }

        let db_max_connections = parse(&lookup, "WMS_DB_MAX_CONNECTIONS", 5u32)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "WMS_DB_MAX_CONNECTIONS",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse(&lookup, "WMS_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            jwt_secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            db_max_connections,
            default_page_limit,
            log_format: parse(&lookup, "WMS_LOG_FORMAT", LogFormat::Json)?,
        })
    }

    /// In-memory configuration with the given secret (tests, local runs).
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            database_url: None,
            db_max_connections: 1,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }

    /// Log about defaults that must not reach production. Call after logging is up.
    pub fn warn_insecure_defaults(&self) {
        if self.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
        }
        if self.database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; records are kept in memory only");
        }
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.default_page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_overrides() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("WMS_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "prod"),
            ("DATABASE_URL", "postgres://wms@db/wms"),
            ("WMS_DEFAULT_PAGE_LIMIT", "25"),
            ("WMS_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.jwt_secret, "prod");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://wms@db/wms"));
        assert_eq!(cfg.default_page_limit, 25);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = ApiConfig::from_lookup(lookup(&[("WMS_BIND_ADDR", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WMS_BIND_ADDR", .. }));

        let err = ApiConfig::from_lookup(lookup(&[("WMS_DEFAULT_PAGE_LIMIT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WMS_DEFAULT_PAGE_LIMIT", .. }));
    }
}
