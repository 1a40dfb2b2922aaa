use thiserror::Error;

use crate::infrastructure::api::ApiClientError;
use crate::infrastructure::persistence::DbError;

/// Error type surfaced by sync operations and cached reads.
///
/// Cloneable so that every caller sharing a deduplicated operation receives
/// the same failure.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Remote API error: {0}")]
    Api(#[from] ApiClientError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl WalletError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WalletError::Api(e) if e.is_unauthorized())
    }
}

impl From<sea_orm::DbErr> for WalletError {
    fn from(err: sea_orm::DbErr) -> Self {
        WalletError::Db(err.into())
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
