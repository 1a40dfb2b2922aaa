//! Lazily fetched foreign rows a sync operation needs to be complete.

use sea_orm::ConnectionTrait;

use crate::domain::models::{Asset, User};
use crate::domain::WalletResult;
use crate::infrastructure::api::WalletApi;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::{
    asset::save as asset_save, user_repository, Repositories,
};

/// Rows fetched to satisfy references, written later inside the caller's
/// transaction.
///
/// Checks run against the pool before the transaction opens. Inserts never
/// overwrite, so a row written concurrently by another sync wins.
#[derive(Debug, Clone, Default)]
pub struct Backfill {
    assets: Vec<Asset>,
    users: Vec<User>,
}

impl Backfill {
    /// Make sure `asset_id` and its chain asset exist locally
    pub async fn for_asset(
        repos: &Repositories,
        api: &dyn WalletApi,
        asset_id: &str,
    ) -> WalletResult<Self> {
        let mut assets = Vec::new();

        let chain_id = match repos.asset.find_by_id(asset_id).await? {
            Some(local) => local.chain_id,
            None => {
                tracing::debug!("Backfilling missing asset {}", asset_id);
                let fetched = api.fetch_asset(asset_id).await?;
                let chain_id = fetched.chain_id.clone();
                assets.push(fetched);
                chain_id
            }
        };

        if !chain_id.is_empty() && chain_id != asset_id {
            let known = repos.asset.existing_ids(&[chain_id.clone()]).await?;
            if known.is_empty() {
                tracing::debug!("Backfilling missing chain asset {}", chain_id);
                assets.push(api.fetch_asset(&chain_id).await?);
            }
        }

        Ok(Self {
            assets,
            users: Vec::new(),
        })
    }

    /// Make sure every id in `user_ids` exists locally, with one batched fetch
    pub async fn for_users(
        repos: &Repositories,
        api: &dyn WalletApi,
        user_ids: &[String],
    ) -> WalletResult<Self> {
        let mut candidates: Vec<String> = Vec::new();
        for id in user_ids {
            if !id.is_empty() && !candidates.contains(id) {
                candidates.push(id.clone());
            }
        }
        if candidates.is_empty() {
            return Ok(Self::default());
        }

        let existing = repos.user.existing_ids(&candidates).await?;
        let missing: Vec<String> = candidates
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();
        if missing.is_empty() {
            return Ok(Self::default());
        }

        tracing::debug!("Backfilling {} missing users", missing.len());
        let users = api.fetch_users(&missing).await?;

        Ok(Self {
            assets: Vec::new(),
            users,
        })
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.assets.extend(other.assets);
        self.users.extend(other.users);
        self
    }

    pub fn touches_assets(&self) -> bool {
        !self.assets.is_empty()
    }

    pub fn touches_users(&self) -> bool {
        !self.users.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_assets() && !self.touches_users()
    }

    /// Insert the fetched rows, skipping any that exist by now
    pub async fn apply<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbError> {
        asset_save::insert_missing(db, &self.assets).await?;
        user_repository::insert_missing(db, &self.users).await?;
        Ok(())
    }
}
