//! Runtime configuration from the environment (after `.env` is loaded by the binary).

use crate::error::ConfigError;
use std::net::SocketAddr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub store: StoreKind,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub const DEFAULT_DATABASE_URL: &'static str = "postgres://localhost/commerce";
    pub const DEFAULT_BIND_ADDR: &'static str = "127.0.0.1:5000";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("COMMERCE_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "COMMERCE_STORE",
                    value: other.to_string(),
                })
            }
        };
        Ok(AppConfig {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.into()),
            store,
            bind_addr: parse_or(&lookup, "BIND_ADDR", Self::DEFAULT_BIND_ADDR)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", "5")?,
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", "65536")?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, AppConfig::DEFAULT_DATABASE_URL);
        assert_eq!(cfg.store, StoreKind::Postgres);
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.body_limit_bytes, 65536);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("COMMERCE_STORE", "memory"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(cfg.store, StoreKind::Memory);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_connections, 12);
    }

    #[test]
    fn rejects_bad_values() {
        let err = config(&[("DB_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. }));
        let err = config(&[("COMMERCE_STORE", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "COMMERCE_STORE", .. }));
    }
}
