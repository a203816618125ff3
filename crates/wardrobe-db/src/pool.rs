//! Connection pool for the wardrobe database.
//!
//! Every catalog and tagging call holds exactly one pooled connection, so
//! `max_connections` bounds how many of them run at once.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use wardrobe_core::defaults;
use wardrobe_core::{Error, Result};

/// Pool sizing and timeouts, read from the environment by
/// [`WardrobeConfig`](crate::WardrobeConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a call waits for a free connection before failing with a
    /// transient pool timeout.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DB_MAX_CONNECTIONS,
            min_connections: defaults::DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DB_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DB_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Reject settings sqlx would only complain about at connect time.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(Duration::from_secs(defaults::DB_MAX_LIFETIME_SECS))
    }
}

/// Validate `config` and open a pool against `database_url`.
pub async fn open_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    config.validate()?;
    let start = Instant::now();

    let pool = config
        .pool_options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "open",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Opened wardrobe database pool"
    );
    Ok(pool)
}

/// Log pool occupancy; warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();
    let saturated = size > 0 && idle == 0;

    if saturated {
        warn!(
            subsystem = "db",
            component = "pool",
            op = "metrics",
            pool_size = size,
            "No idle connections, tag sync calls are queueing"
        );
    } else {
        debug!(
            subsystem = "db",
            component = "pool",
            op = "metrics",
            pool_size = size,
            pool_idle = idle,
            "Pool occupancy"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_core_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, defaults::DB_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, defaults::DB_MIN_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout,
            Duration::from_secs(defaults::DB_CONNECT_TIMEOUT_SECS)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters_override_defaults() {
        let config = PoolConfig::new()
            .max_connections(20)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(60))
            .idle_timeout(Duration::from_secs(5));

        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(60));
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let config = PoolConfig::new().max_connections(0).min_connections(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_inverted_bounds_rejected_before_connecting() {
        let config = PoolConfig::new().max_connections(1).min_connections(4);
        let result = open_pool("postgres://unused/never", &config).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
