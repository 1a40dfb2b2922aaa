//! Asset repository module

mod query;
pub mod save;

use sea_orm::DatabaseConnection;

use crate::domain::models::{Asset, AssetExtra};
use crate::infrastructure::persistence::error::DbError;

/// Repository for asset-related database operations.
///
/// Methods run on the pool. The write functions in [`save`] are also usable
/// inside a transaction.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    db: DatabaseConnection,
}

impl AssetRepository {
    /// Create a new AssetRepository
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find asset by asset_id
    pub async fn find_by_id(&self, asset_id: &str) -> Result<Option<Asset>, DbError> {
        query::find_by_id(&self.db, asset_id).await
    }

    /// Find every stored asset, unordered
    pub async fn find_all(&self) -> Result<Vec<Asset>, DbError> {
        query::find_all(&self.db).await
    }

    /// Return the subset of `asset_ids` stored locally
    pub async fn existing_ids(&self, asset_ids: &[String]) -> Result<Vec<String>, DbError> {
        query::existing_ids(&self.db, asset_ids).await
    }

    /// Local settings of an asset; absent means defaults
    pub async fn find_extra(&self, asset_id: &str) -> Result<Option<AssetExtra>, DbError> {
        query::find_extra(&self.db, asset_id).await
    }

    /// Upsert assets, including balances
    pub async fn upsert_many(&self, assets: &[Asset]) -> Result<u64, DbError> {
        save::upsert_many(&self.db, assets).await
    }

    /// Set or clear the hidden flag of an asset
    pub async fn set_hidden(&self, asset_id: &str, hidden: bool) -> Result<(), DbError> {
        save::set_hidden(&self.db, asset_id, hidden).await
    }
}
