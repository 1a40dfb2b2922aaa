// Error types for database operations

use thiserror::Error;

/// Error types for database connection and query operations
#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// Error occurred during database connection attempt
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error occurred while opening or committing a transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// Error occurred while applying migrations
    #[error("Database migration error: {0}")]
    MigrationError(String),
}

impl From<sea_orm::DbErr> for DbError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(e) => DbError::ConnectionError(e.to_string()),
            other => DbError::QueryError(other.to_string()),
        }
    }
}
