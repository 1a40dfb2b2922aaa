use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{Asset, Fiat, Snapshot, Ticker, User};
use crate::infrastructure::api::error::ApiClientError;

/// Parameters of a snapshot history request
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SnapshotRequest {
    pub asset_id: Option<String>,
    pub opponent_id: Option<String>,
    /// Only snapshots created strictly before this timestamp
    pub offset: Option<String>,
    pub limit: u64,
}

/// Remote wallet API the sync engine reads from
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Profile of the signed-in user
    async fn fetch_profile(&self) -> Result<User, ApiClientError>;

    /// Every asset the user holds or has held
    async fn fetch_assets(&self) -> Result<Vec<Asset>, ApiClientError>;

    async fn fetch_asset(&self, asset_id: &str) -> Result<Asset, ApiClientError>;

    async fn fetch_exchange_rates(&self) -> Result<Vec<Fiat>, ApiClientError>;

    /// Snapshots ordered by `created_at` descending
    async fn fetch_snapshots(
        &self,
        request: &SnapshotRequest,
    ) -> Result<Vec<Snapshot>, ApiClientError>;

    async fn fetch_snapshot(&self, snapshot_id: &str) -> Result<Snapshot, ApiClientError>;

    /// Batched user lookup; unknown ids are left out of the result
    async fn fetch_users(&self, user_ids: &[String]) -> Result<Vec<User>, ApiClientError>;

    /// Price of an asset now, or at `at` when given
    async fn fetch_ticker(
        &self,
        asset_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<Ticker, ApiClientError>;

    /// Network-wide top assets, most popular first
    async fn fetch_top_assets(&self) -> Result<Vec<Asset>, ApiClientError>;

    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, ApiClientError>;
}
