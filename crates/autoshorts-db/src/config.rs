//! Database configuration.

use std::time::Duration;

use crate::error::{DbError, DbResult};

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Apply embedded migrations on connect
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> DbResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::config_error("DATABASE_URL not set"))?;

        let mut config = Self::new(database_url);
        if let Some(max) = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.max_connections = max;
        }
        if let Some(secs) = std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.acquire_timeout = Duration::from_secs(secs);
        }
        config.run_migrations = std::env::var("DB_RUN_MIGRATIONS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Ok(config)
    }
}
