use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tokio::sync::watch;

use super::backfill::Backfill;
use crate::application::cache::{QueryCache, QueryFamily};
use crate::application::inflight::InFlight;
use crate::application::query::MAX_PAGE_LIMIT;
use crate::domain::models::{Snapshot, User};
use crate::domain::{Session, WalletError, WalletResult};
use crate::infrastructure::api::{SessionGuardedApi, SnapshotRequest, WalletApi};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::{
    asset::save as asset_save, fiat_repository, snapshot_repository, user_repository,
    Repositories,
};

/// Snapshots fetched per page unless configured otherwise
pub const DEFAULT_SNAPSHOT_LIMIT: u64 = 30;

/// Outcome of one snapshot page sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPageSync {
    /// Rows the API returned
    pub fetched: usize,
    /// `created_at` of the oldest row, the offset of the following page
    pub next_cursor: Option<String>,
    /// The API returned fewer rows than requested
    pub is_last: bool,
}

impl SnapshotPageSync {
    fn from_page(snapshots: &[Snapshot], limit: u64) -> Self {
        Self {
            fetched: snapshots.len(),
            next_cursor: snapshots.last().map(|s| s.created_at.clone()),
            is_last: (snapshots.len() as u64) < limit,
        }
    }
}

type PageKey = (String, Option<String>);

struct Inner {
    db: DatabaseConnection,
    repos: Repositories,
    api: Arc<dyn WalletApi>,
    session: Arc<Session>,
    cache: Arc<QueryCache>,
    top_asset_ids: watch::Sender<Vec<String>>,
    all_assets: InFlight<(), WalletResult<()>>,
    assets: InFlight<String, WalletResult<()>>,
    pages: InFlight<PageKey, WalletResult<SnapshotPageSync>>,
    snapshots: InFlight<String, WalletResult<()>>,
    profile: InFlight<(), WalletResult<User>>,
    top_assets: InFlight<(), WalletResult<Vec<String>>>,
    searches: InFlight<String, WalletResult<usize>>,
}

/// Pulls remote wallet data into the local store.
///
/// Every operation fetches everything it needs first, writes it in a single
/// transaction, and only then invalidates the affected query families. A
/// remote failure therefore never leaves a partial write behind. Concurrent
/// calls with the same key share one run.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

impl SyncEngine {
    pub fn new(
        db: DatabaseConnection,
        api: Arc<dyn WalletApi>,
        session: Arc<Session>,
        cache: Arc<QueryCache>,
    ) -> Self {
        let guarded: Arc<dyn WalletApi> = Arc::new(SessionGuardedApi::new(api, session.clone()));
        let (top_asset_ids, _) = watch::channel(Vec::new());

        Self {
            inner: Arc::new(Inner {
                repos: Repositories::new(db.clone()),
                db,
                api: guarded,
                session,
                cache,
                top_asset_ids,
                all_assets: InFlight::new(),
                assets: InFlight::new(),
                pages: InFlight::new(),
                snapshots: InFlight::new(),
                profile: InFlight::new(),
                top_assets: InFlight::new(),
                searches: InFlight::new(),
            }),
        }
    }

    /// Session-guarded API used by every sync
    pub fn api(&self) -> Arc<dyn WalletApi> {
        self.inner.api.clone()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// Ids of the last top assets list, most popular first
    pub fn top_asset_ids(&self) -> Vec<String> {
        self.inner.top_asset_ids.borrow().clone()
    }

    async fn begin(&self) -> Result<DatabaseTransaction, DbError> {
        self.inner
            .db
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    async fn commit(txn: DatabaseTransaction) -> Result<(), DbError> {
        txn.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    fn report<T>(operation: &str, result: WalletResult<T>) -> WalletResult<T> {
        if let Err(e) = &result {
            tracing::warn!("{} failed: {}", operation, e);
        }
        result
    }

    /// Full asset resync.
    ///
    /// Balances of assets missing from the response drop to zero; rows are
    /// never deleted.
    pub async fn sync_all_assets(&self) -> WalletResult<()> {
        let engine = self.clone();
        let result = self
            .inner
            .all_assets
            .run((), move || async move { engine.run_all_assets().await })
            .await;
        Self::report("Asset sync", result)
    }

    async fn run_all_assets(&self) -> WalletResult<()> {
        let api = &self.inner.api;
        let (assets, fiats) = tokio::try_join!(api.fetch_assets(), api.fetch_exchange_rates())?;

        let txn = self.begin().await?;
        asset_save::zero_all_balances(&txn).await?;
        asset_save::upsert_many(&txn, &assets).await?;
        fiat_repository::replace_all(&txn, &fiats).await?;
        Self::commit(txn).await?;

        self.inner
            .cache
            .invalidate_all(&[QueryFamily::Asset, QueryFamily::Fiat]);
        tracing::info!("Synced {} assets and {} exchange rates", assets.len(), fiats.len());
        Ok(())
    }

    /// Refresh one asset and the exchange rates, leaving other balances alone
    pub async fn sync_asset(&self, asset_id: &str) -> WalletResult<()> {
        let engine = self.clone();
        let id = asset_id.to_string();
        let result = self
            .inner
            .assets
            .run(id.clone(), move || async move { engine.run_asset(&id).await })
            .await;
        Self::report("Asset sync", result)
    }

    async fn run_asset(&self, asset_id: &str) -> WalletResult<()> {
        let api = &self.inner.api;
        let (asset, fiats) =
            tokio::try_join!(api.fetch_asset(asset_id), api.fetch_exchange_rates())?;

        let txn = self.begin().await?;
        asset_save::upsert_many(&txn, std::slice::from_ref(&asset)).await?;
        fiat_repository::upsert_many(&txn, &fiats).await?;
        Self::commit(txn).await?;

        self.inner
            .cache
            .invalidate_all(&[QueryFamily::Asset, QueryFamily::Fiat]);
        tracing::debug!("Synced asset {}", asset_id);
        Ok(())
    }

    /// Fetch one page of an asset's history, newest first.
    ///
    /// `offset` is the `created_at` of the last row of the previous page; no
    /// offset starts from the newest snapshot.
    pub async fn sync_snapshot_page(
        &self,
        asset_id: &str,
        offset: Option<&str>,
        limit: u64,
    ) -> WalletResult<SnapshotPageSync> {
        let engine = self.clone();
        let key: PageKey = (asset_id.to_string(), offset.map(str::to_string));
        let (id, cursor) = key.clone();
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let result = self
            .inner
            .pages
            .run(key, move || async move {
                engine.run_snapshot_page(id, cursor, limit).await
            })
            .await;
        Self::report("Snapshot page sync", result)
    }

    async fn run_snapshot_page(
        &self,
        asset_id: String,
        offset: Option<String>,
        limit: u64,
    ) -> WalletResult<SnapshotPageSync> {
        let api = self.inner.api.as_ref();
        let repos = &self.inner.repos;
        let request = SnapshotRequest {
            asset_id: Some(asset_id.clone()),
            opponent_id: None,
            offset,
            limit,
        };

        let (snapshots, asset_backfill) = tokio::try_join!(
            async { api.fetch_snapshots(&request).await.map_err(WalletError::from) },
            Backfill::for_asset(repos, api, &asset_id),
        )?;

        let opponent_ids: Vec<String> = snapshots
            .iter()
            .filter_map(|s| s.opponent_id.clone())
            .collect();
        let backfill = asset_backfill.merge(Backfill::for_users(repos, api, &opponent_ids).await?);

        let txn = self.begin().await?;
        snapshot_repository::upsert_many(&txn, &snapshots).await?;
        backfill.apply(&txn).await?;
        Self::commit(txn).await?;

        self.invalidate_after_snapshot_write(&backfill);
        tracing::debug!(
            "Synced {} snapshots of asset {}",
            snapshots.len(),
            asset_id
        );
        Ok(SnapshotPageSync::from_page(&snapshots, limit))
    }

    /// Fetch one snapshot together with its asset, chain and users
    pub async fn sync_snapshot(&self, snapshot_id: &str) -> WalletResult<()> {
        let engine = self.clone();
        let id = snapshot_id.to_string();
        let result = self
            .inner
            .snapshots
            .run(id.clone(), move || async move { engine.run_snapshot(&id).await })
            .await;
        Self::report("Snapshot sync", result)
    }

    async fn run_snapshot(&self, snapshot_id: &str) -> WalletResult<()> {
        let api = self.inner.api.as_ref();
        let repos = &self.inner.repos;

        let snapshot = api.fetch_snapshot(snapshot_id).await?;
        let user_ids = snapshot.referenced_user_ids();
        let (asset_backfill, user_backfill) = tokio::try_join!(
            Backfill::for_asset(repos, api, &snapshot.asset_id),
            Backfill::for_users(repos, api, &user_ids),
        )?;
        let backfill = asset_backfill.merge(user_backfill);

        let txn = self.begin().await?;
        snapshot_repository::upsert_many(&txn, std::slice::from_ref(&snapshot)).await?;
        backfill.apply(&txn).await?;
        Self::commit(txn).await?;

        self.invalidate_after_snapshot_write(&backfill);
        tracing::debug!("Synced snapshot {}", snapshot_id);
        Ok(())
    }

    fn invalidate_after_snapshot_write(&self, backfill: &Backfill) {
        let cache = &self.inner.cache;
        cache.invalidate(QueryFamily::Snapshot);
        if backfill.touches_assets() {
            cache.invalidate(QueryFamily::Asset);
        }
        if backfill.touches_users() {
            cache.invalidate(QueryFamily::User);
        }
    }

    /// Load the signed-in user into the session; it decides the fiat currency
    pub async fn sync_profile(&self) -> WalletResult<User> {
        let engine = self.clone();
        let result = self
            .inner
            .profile
            .run((), move || async move { engine.run_profile().await })
            .await;
        Self::report("Profile sync", result)
    }

    async fn run_profile(&self) -> WalletResult<User> {
        let profile = self.inner.api.fetch_profile().await?;

        user_repository::upsert_many(&self.inner.db, std::slice::from_ref(&profile)).await?;
        self.inner.session.set_profile(profile.clone());

        self.inner.cache.invalidate(QueryFamily::User);
        tracing::info!(
            "Profile loaded, fiat currency {}",
            self.inner.session.fiat_currency()
        );
        Ok(profile)
    }

    /// Store the network's top assets and remember their order
    pub async fn sync_top_assets(&self) -> WalletResult<Vec<String>> {
        let engine = self.clone();
        let result = self
            .inner
            .top_assets
            .run((), move || async move { engine.run_top_assets().await })
            .await;
        Self::report("Top assets sync", result)
    }

    async fn run_top_assets(&self) -> WalletResult<Vec<String>> {
        let assets = self.inner.api.fetch_top_assets().await?;

        let txn = self.begin().await?;
        asset_save::upsert_market_data(&txn, &assets).await?;
        Self::commit(txn).await?;

        let ids: Vec<String> = assets.into_iter().map(|a| a.asset_id).collect();
        self.inner.top_asset_ids.send_replace(ids.clone());

        self.inner
            .cache
            .invalidate_all(&[QueryFamily::Asset, QueryFamily::TopAssetId]);
        tracing::debug!("Synced {} top assets", ids.len());
        Ok(ids)
    }

    /// Store the remote search results for `query`; blank queries do nothing
    pub async fn sync_search_assets(&self, query: &str) -> WalletResult<usize> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(0);
        }

        let engine = self.clone();
        let result = self
            .inner
            .searches
            .run(query.clone(), move || async move {
                engine.run_search_assets(&query).await
            })
            .await;
        Self::report("Asset search sync", result)
    }

    async fn run_search_assets(&self, query: &str) -> WalletResult<usize> {
        let assets = self.inner.api.search_assets(query).await?;

        let txn = self.begin().await?;
        asset_save::upsert_market_data(&txn, &assets).await?;
        Self::commit(txn).await?;

        self.inner.cache.invalidate(QueryFamily::Asset);
        Ok(assets.len())
    }

    /// Hide or show an asset in filtered lists. Local only.
    pub async fn set_asset_hidden(&self, asset_id: &str, hidden: bool) -> WalletResult<()> {
        self.inner.repos.asset.set_hidden(asset_id, hidden).await?;
        self.inner.cache.invalidate(QueryFamily::Asset);
        tracing::debug!("Asset {} hidden={}", asset_id, hidden);
        Ok(())
    }
}
