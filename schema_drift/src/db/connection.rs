//! Database connection handling
//!
//! This module establishes the MySQL connection pool the catalog provider reads from.

use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::Result;

const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Pooled connection to the database whose catalog is inspected
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: MySqlPool,
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        let timeout_seconds = config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let pool = MySqlPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect(&config.url)
            .await?;

        tracing::debug!(pool_size, timeout_seconds, "Connected to database");

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}
