//! Postgres pools for the two privilege levels.
//!
//! The caller pool only ever reads owner-scoped rows. The service pool holds
//! the credentials allowed to write material content and stays small since it
//! serves one UPDATE per successful extraction.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use studia_core::{Error, Result};

/// Which credentials a pool connects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolRole {
    Caller,
    Service,
}

impl PoolRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolRole::Caller => "caller",
            PoolRole::Service => "service",
        }
    }
}

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub role: PoolRole,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            role: PoolRole::Caller,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolConfig {
    /// Caller pool sized from `DB_MAX_CONNECTIONS` / `DB_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_connections),
            acquire_timeout: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.acquire_timeout),
            ..base
        }
    }

    /// Pool for the service-privileged content writer.
    pub fn service() -> Self {
        Self {
            role: PoolRole::Service,
            max_connections: 2,
            min_connections: 0,
            ..Self::default()
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Connect a caller pool with default settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Connect a pool with explicit settings.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        role = config.role.as_str(),
        max_connections = config.max_connections,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool connected"
    );
    Ok(pool)
}
