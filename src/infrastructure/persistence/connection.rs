use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Lifetime and idle limit for the single in-memory connection
const MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Manages the database connection pool
#[derive(Clone)]
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Connect and bring the schema up to date
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        logging::log_database_connection_details(&config.url);

        let connection = Database::connect(connect_options(config)).await.map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            DbError::ConnectionError(format!("Failed to connect to database: {}", e))
        })?;
        tracing::info!("Database connection established successfully");

        let pool = DbPool { connection };
        pool.migrate().await?;
        Ok(pool)
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<(), DbError> {
        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DbError::MigrationError(e.to_string()))?;
        tracing::debug!("Database schema is up to date");
        Ok(())
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // An in-memory SQLite database lives and dies with its connection, so the
    // pool must never recycle it
    if is_memory_url(&config.url) {
        options
            .max_connections(1)
            .idle_timeout(MEMORY_CONNECTION_LIFETIME)
            .max_lifetime(MEMORY_CONNECTION_LIFETIME);
    } else {
        options.max_connections(config.max_connections.max(1));
    }
    options
}
