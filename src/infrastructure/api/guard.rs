use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::models::{Asset, Fiat, Snapshot, Ticker, User};
use crate::domain::Session;
use crate::infrastructure::api::error::ApiClientError;
use crate::infrastructure::api::wallet_api::{SnapshotRequest, WalletApi};

/// Wraps a [`WalletApi`] with the session's token lifecycle.
///
/// Calls fail with [`ApiClientError::Unauthorized`] without reaching the inner
/// API while no token is set. A 401 answer clears the token the request was
/// made with; a token set while the request was in flight is kept.
pub struct SessionGuardedApi {
    inner: Arc<dyn WalletApi>,
    session: Arc<Session>,
}

impl SessionGuardedApi {
    pub fn new(inner: Arc<dyn WalletApi>, session: Arc<Session>) -> Self {
        Self { inner, session }
    }

    fn ensure_token(&self) -> Result<String, ApiClientError> {
        self.session.token().ok_or(ApiClientError::Unauthorized)
    }

    fn observe<T>(
        &self,
        token: &str,
        result: Result<T, ApiClientError>,
    ) -> Result<T, ApiClientError> {
        if let Err(e) = &result {
            if e.is_unauthorized() && !self.session.clear_token_if(token) {
                tracing::debug!("Ignoring 401 for a token that was already replaced");
            }
        }
        result
    }
}

#[async_trait]
impl WalletApi for SessionGuardedApi {
    async fn fetch_profile(&self) -> Result<User, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_profile().await)
    }

    async fn fetch_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_assets().await)
    }

    async fn fetch_asset(&self, asset_id: &str) -> Result<Asset, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_asset(asset_id).await)
    }

    async fn fetch_exchange_rates(&self) -> Result<Vec<Fiat>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_exchange_rates().await)
    }

    async fn fetch_snapshots(
        &self,
        request: &SnapshotRequest,
    ) -> Result<Vec<Snapshot>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_snapshots(request).await)
    }

    async fn fetch_snapshot(&self, snapshot_id: &str) -> Result<Snapshot, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_snapshot(snapshot_id).await)
    }

    async fn fetch_users(&self, user_ids: &[String]) -> Result<Vec<User>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_users(user_ids).await)
    }

    async fn fetch_ticker(
        &self,
        asset_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<Ticker, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_ticker(asset_id, at).await)
    }

    async fn fetch_top_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.fetch_top_assets().await)
    }

    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, ApiClientError> {
        let token = self.ensure_token()?;
        self.observe(&token, self.inner.search_assets(query).await)
    }
}
