use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Runtime configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub jwt_secret: String,
    /// `None` means no database is configured and reviews live in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub bind_addr: SocketAddr,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// ✅ Load environment variables and set defaults
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env only once

        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            database_url: optional("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_min_connections: parse_or("DB_MIN_CONNECTIONS", 2)?,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            log_dir: optional("LOG_DIR").map(PathBuf::from),
        })
    }

    /// Configuration for tests and local tooling: in-memory store, ephemeral port.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            database_url: None,
            db_max_connections: 10,
            db_min_connections: 2,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_dir: None,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_uses_memory_store_and_ephemeral_port() {
        let config = Config::for_secret("secret");
        assert_eq!(config.jwt_secret, "secret");
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr.port(), 0);
    }

    #[test]
    fn parse_or_falls_back_to_default_when_unset() {
        let value: u32 = parse_or("MENU_REVIEWS_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
