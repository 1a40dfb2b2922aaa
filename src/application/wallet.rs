use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::application::cache::{QueryCache, QueryKey};
use crate::application::feed::SnapshotFeed;
use crate::application::query::{
    AssetFilter, AssetQuery, AssetQueryComposer, AssetSort, SnapshotFilter,
    SnapshotQueryComposer,
};
use crate::application::sync::SyncEngine;
use crate::config::AppConfig;
use crate::domain::models::{AssetView, Fiat, SnapshotView, Ticker, User};
use crate::domain::{Session, WalletError, WalletResult};
use crate::infrastructure::api::{MixinApiClient, WalletApi};
use crate::infrastructure::persistence::repositories::Repositories;
use crate::infrastructure::persistence::DbPool;

/// Entry point for a presentation layer.
///
/// Reads go through the query cache and are keyed by the active fiat
/// currency; writes are triggered through [`Wallet::sync`].
#[derive(Clone)]
pub struct Wallet {
    db: DatabaseConnection,
    repos: Repositories,
    session: Arc<Session>,
    cache: Arc<QueryCache>,
    engine: SyncEngine,
}

impl Wallet {
    pub fn new(
        db: DatabaseConnection,
        api: Arc<dyn WalletApi>,
        session: Arc<Session>,
        cache: Arc<QueryCache>,
    ) -> Self {
        let engine = SyncEngine::new(db.clone(), api, session.clone(), cache.clone());
        Self {
            repos: Repositories::new(db.clone()),
            db,
            session,
            cache,
            engine,
        }
    }

    /// Open the configured database and HTTP client
    pub async fn connect(config: &AppConfig) -> WalletResult<Self> {
        let pool = DbPool::new(&config.database).await?;
        let session = Arc::new(Session::new(config.api.access_token.clone()));
        let api = Arc::new(MixinApiClient::new(config, session.clone())?);
        let cache = Arc::new(
            QueryCache::new(config.sync.stale_after()).with_cache_time(config.sync.cache_time()),
        );

        Ok(Self::new(
            pool.get_connection().clone(),
            api,
            session,
            cache,
        ))
    }

    pub fn sync(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn query_assets(&self, query: AssetQuery) -> WalletResult<Vec<AssetView>> {
        let currency = self.session.fiat_currency();
        let key = QueryKey::Assets {
            currency: currency.clone(),
            query: query.clone(),
        };
        let db = self.db.clone();
        self.cache
            .fetch(key, move || async move {
                AssetQueryComposer::find(&db, &currency, &query)
                    .await
                    .map_err(WalletError::from)
            })
            .await
    }

    pub async fn query_asset(&self, asset_id: &str) -> WalletResult<Option<AssetView>> {
        let currency = self.session.fiat_currency();
        let asset_id = asset_id.to_string();
        let key = QueryKey::Asset {
            currency: currency.clone(),
            asset_id: asset_id.clone(),
        };
        let db = self.db.clone();
        self.cache
            .fetch(key, move || async move {
                AssetQueryComposer::find_one(&db, &currency, &asset_id)
                    .await
                    .map_err(WalletError::from)
            })
            .await
    }

    /// One page of history; `cursor` is the `created_at` of the previous page's last row
    pub async fn query_snapshot_page(
        &self,
        filter: SnapshotFilter,
        cursor: Option<String>,
        limit: u64,
    ) -> WalletResult<Vec<SnapshotView>> {
        let currency = self.session.fiat_currency();
        let key = QueryKey::SnapshotPage {
            currency: currency.clone(),
            filter: filter.clone(),
            cursor: cursor.clone(),
            limit,
        };
        let db = self.db.clone();
        self.cache
            .fetch(key, move || async move {
                SnapshotQueryComposer::find_page(&db, &currency, &filter, cursor.as_deref(), limit)
                    .await
                    .map_err(WalletError::from)
            })
            .await
    }

    pub async fn query_snapshot(&self, snapshot_id: &str) -> WalletResult<Option<SnapshotView>> {
        let currency = self.session.fiat_currency();
        let snapshot_id = snapshot_id.to_string();
        let key = QueryKey::Snapshot {
            currency: currency.clone(),
            snapshot_id: snapshot_id.clone(),
        };
        let db = self.db.clone();
        self.cache
            .fetch(key, move || async move {
                SnapshotQueryComposer::find_one(&db, &currency, &snapshot_id)
                    .await
                    .map_err(WalletError::from)
            })
            .await
    }

    pub async fn query_user(&self, user_id: &str) -> WalletResult<Option<User>> {
        let key = QueryKey::User {
            user_id: user_id.to_string(),
        };
        let repos = self.repos.clone();
        let user_id = user_id.to_string();
        self.cache
            .fetch(key, move || async move { repos.user.find_by_id(&user_id).await.map_err(WalletError::from) })
            .await
    }

    pub async fn query_fiats(&self) -> WalletResult<Vec<Fiat>> {
        let repos = self.repos.clone();
        self.cache
            .fetch(QueryKey::Fiats, move || async move {
                repos.fiat.find_all().await.map_err(WalletError::from)
            })
            .await
    }

    /// Asset price now or at `at`, straight from the API
    pub async fn query_ticker(
        &self,
        asset_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> WalletResult<Ticker> {
        let key = QueryKey::Ticker {
            asset_id: asset_id.to_string(),
            at: at.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let api = self.engine.api();
        let asset_id = asset_id.to_string();
        self.cache
            .fetch(key, move || async move {
                api.fetch_ticker(&asset_id, at).await.map_err(WalletError::from)
            })
            .await
    }

    /// Top assets in the order of the last top-assets sync
    pub async fn query_top_assets(&self) -> WalletResult<Vec<AssetView>> {
        let engine = self.engine.clone();
        let ids: Vec<String> = self
            .cache
            .fetch(QueryKey::TopAssetIds, move || async move {
                Ok::<_, WalletError>(engine.top_asset_ids())
            })
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = AssetQuery::new()
            .filter(AssetFilter::IdIn(ids.clone()))
            .sort(AssetSort::Explicit(ids.clone()))
            .limit(ids.len() as u64);
        self.query_assets(query).await
    }

    /// Local assets matching `text`, best match first
    pub async fn query_search_assets(&self, text: &str) -> WalletResult<Vec<AssetView>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let query = AssetQuery::new()
            .filter(AssetFilter::Text(text.to_string()))
            .sort(AssetSort::Relevance(text.to_string()));
        self.query_assets(query).await
    }

    /// Infinite-scroll history of one asset
    pub fn snapshot_feed(&self, asset_id: &str, limit: u64) -> SnapshotFeed {
        SnapshotFeed::new(self.clone(), asset_id, limit)
    }
}
