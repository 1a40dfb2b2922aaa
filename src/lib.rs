//! Local data synchronization layer of a Mixin wallet client.
//!
//! Remote wallet data (assets, exchange rates, snapshots, users) is fetched
//! through [`infrastructure::api::WalletApi`], written to a local SQLite store
//! in one transaction per operation, and read back through cached, typed
//! queries exposed by [`application::Wallet`].

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;

pub use application::cache::{QueryCache, QueryFamily, QueryKey};
pub use application::query::{AssetFilter, AssetQuery, AssetSort, SnapshotFilter};
pub use application::sync::{SnapshotPageSync, SyncEngine};
pub use application::{SnapshotFeed, Wallet};
pub use config::AppConfig;
pub use domain::{Session, WalletError, WalletResult};
