#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wallet_sync::application::cache::QueryCache;
use wallet_sync::config::DatabaseConfig;
use wallet_sync::domain::models::{Asset, Fiat, Snapshot, SnapshotType, Ticker, User};
use wallet_sync::domain::Session;
use wallet_sync::infrastructure::api::{ApiClientError, SnapshotRequest, WalletApi};
use wallet_sync::infrastructure::persistence::DbPool;
use wallet_sync::Wallet;

/// Scripted in-process wallet API that records every call
#[derive(Default)]
pub struct FakeApi {
    pub held: Mutex<Vec<Asset>>,
    pub catalog: Mutex<HashMap<String, Asset>>,
    pub fiats: Mutex<Vec<Fiat>>,
    pub snapshots: Mutex<Vec<Snapshot>>,
    pub users: Mutex<HashMap<String, User>>,
    pub profile: Mutex<Option<User>>,
    pub top: Mutex<Vec<String>>,
    pub failures: Mutex<HashMap<&'static str, ApiClientError>>,
    pub delay: Mutex<Option<Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Assets returned by `fetch_assets`; also resolvable one by one
    pub fn set_held(&self, assets: Vec<Asset>) {
        let mut catalog = self.catalog.lock().unwrap();
        for asset in &assets {
            catalog.insert(asset.asset_id.clone(), asset.clone());
        }
        *self.held.lock().unwrap() = assets;
    }

    /// Assets only resolvable one by one
    pub fn add_catalog(&self, assets: Vec<Asset>) {
        let mut catalog = self.catalog.lock().unwrap();
        for asset in assets {
            catalog.insert(asset.asset_id.clone(), asset);
        }
    }

    pub fn set_fiats(&self, fiats: Vec<Fiat>) {
        *self.fiats.lock().unwrap() = fiats;
    }

    pub fn add_snapshots(&self, snapshots: Vec<Snapshot>) {
        self.snapshots.lock().unwrap().extend(snapshots);
    }

    pub fn add_users(&self, users: Vec<User>) {
        let mut stored = self.users.lock().unwrap();
        for user in users {
            stored.insert(user.user_id.clone(), user);
        }
    }

    pub fn set_top(&self, assets: Vec<Asset>) {
        *self.top.lock().unwrap() = assets.iter().map(|a| a.asset_id.clone()).collect();
        self.add_catalog(assets);
    }

    pub fn fail(&self, method: &'static str, error: ApiClientError) {
        self.failures.lock().unwrap().insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, method: &'static str) -> Result<(), ApiClientError> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.lock().unwrap().get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn lookup_asset(&self, asset_id: &str) -> Result<Asset, ApiClientError> {
        self.catalog
            .lock()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| ApiClientError::ApiError {
                code: 404,
                description: format!("asset {} not found", asset_id),
            })
    }
}

#[async_trait]
impl WalletApi for FakeApi {
    async fn fetch_profile(&self) -> Result<User, ApiClientError> {
        self.enter("fetch_profile").await?;
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiClientError::Unauthorized)
    }

    async fn fetch_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        self.enter("fetch_assets").await?;
        Ok(self.held.lock().unwrap().clone())
    }

    async fn fetch_asset(&self, asset_id: &str) -> Result<Asset, ApiClientError> {
        self.enter("fetch_asset").await?;
        self.lookup_asset(asset_id)
    }

    async fn fetch_exchange_rates(&self) -> Result<Vec<Fiat>, ApiClientError> {
        self.enter("fetch_exchange_rates").await?;
        Ok(self.fiats.lock().unwrap().clone())
    }

    async fn fetch_snapshots(
        &self,
        request: &SnapshotRequest,
    ) -> Result<Vec<Snapshot>, ApiClientError> {
        self.enter("fetch_snapshots").await?;
        let mut page: Vec<Snapshot> = self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| request.asset_id.as_ref().map_or(true, |id| &s.asset_id == id))
            .filter(|s| {
                request
                    .opponent_id
                    .as_ref()
                    .map_or(true, |id| s.opponent_id.as_ref() == Some(id))
            })
            .filter(|s| request.offset.as_ref().map_or(true, |o| &s.created_at < o))
            .cloned()
            .collect();
        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        page.truncate(request.limit as usize);
        Ok(page)
    }

    async fn fetch_snapshot(&self, snapshot_id: &str) -> Result<Snapshot, ApiClientError> {
        self.enter("fetch_snapshot").await?;
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.snapshot_id == snapshot_id)
            .cloned()
            .ok_or_else(|| ApiClientError::ApiError {
                code: 404,
                description: "snapshot not found".into(),
            })
    }

    async fn fetch_users(&self, user_ids: &[String]) -> Result<Vec<User>, ApiClientError> {
        self.enter("fetch_users").await?;
        let users = self.users.lock().unwrap();
        Ok(user_ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn fetch_ticker(
        &self,
        _asset_id: &str,
        _at: Option<DateTime<Utc>>,
    ) -> Result<Ticker, ApiClientError> {
        self.enter("fetch_ticker").await?;
        Ok(Ticker {
            price_usd: "1".into(),
            price_btc: "0.00001".into(),
        })
    }

    async fn fetch_top_assets(&self) -> Result<Vec<Asset>, ApiClientError> {
        self.enter("fetch_top_assets").await?;
        let ids = self.top.lock().unwrap().clone();
        ids.iter().map(|id| self.lookup_asset(id)).collect()
    }

    async fn search_assets(&self, query: &str) -> Result<Vec<Asset>, ApiClientError> {
        self.enter("search_assets").await?;
        let query = query.to_lowercase();
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .values()
            .filter(|a| {
                a.symbol.to_lowercase().contains(&query) || a.name.to_lowercase().contains(&query)
            })
            .cloned()
            .collect())
    }
}

pub fn asset(id: &str, chain_id: &str, symbol: &str, balance: &str, price_usd: &str) -> Asset {
    Asset {
        asset_id: id.to_string(),
        chain_id: chain_id.to_string(),
        asset_key: None,
        mixin_id: None,
        symbol: symbol.to_string(),
        name: format!("{} Token", symbol),
        icon_url: String::new(),
        price_btc: "0".into(),
        change_btc: "0".into(),
        price_usd: price_usd.to_string(),
        change_usd: "0".into(),
        balance: balance.to_string(),
        destination: String::new(),
        tag: String::new(),
        confirmations: 6,
        reserve: None,
    }
}

pub fn fiat(code: &str, rate: &str) -> Fiat {
    Fiat {
        code: code.to_string(),
        rate: Decimal::from_str(rate).unwrap(),
    }
}

pub fn user(id: &str) -> User {
    User {
        user_id: id.to_string(),
        identity_number: format!("7000{}", id.len()),
        full_name: format!("User {}", id),
        ..Default::default()
    }
}

/// Fixed-width timestamp so string order is time order
pub fn timestamp(seconds: u32) -> String {
    format!(
        "2022-03-01T{:02}:{:02}:{:02}.000000000Z",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

pub fn snapshot(id: &str, asset_id: &str, opponent_id: Option<&str>, seconds: u32) -> Snapshot {
    Snapshot {
        snapshot_id: id.to_string(),
        snapshot_type: SnapshotType::Transfer,
        asset_id: asset_id.to_string(),
        opponent_id: opponent_id.map(str::to_string),
        user_id: None,
        amount: "-1.5".into(),
        created_at: timestamp(seconds),
        memo: String::new(),
        trace_id: format!("trace-{}", id),
        sender: None,
        receiver: None,
        transaction_hash: None,
        opening_balance: None,
        closing_balance: None,
        confirmations: None,
    }
}

/// Fresh migrated in-memory database
pub async fn memory_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    DbPool::new(&config)
        .await
        .expect("in-memory database")
        .get_connection()
        .clone()
}

/// Wallet over `db` and `api` with a signed-in session and no stale time
pub fn wallet(db: DatabaseConnection, api: Arc<FakeApi>) -> Wallet {
    let session = Arc::new(Session::new(Some("test-token".to_string())));
    let cache = Arc::new(QueryCache::new(None));
    Wallet::new(db, api, session, cache)
}

pub async fn setup() -> (Wallet, Arc<FakeApi>) {
    let api = FakeApi::new();
    let wallet = wallet(memory_db().await, api.clone());
    (wallet, api)
}
