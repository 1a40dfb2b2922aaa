pub mod client;
pub mod error;
pub mod guard;
pub mod wallet_api;

pub use client::MixinApiClient;
pub use error::ApiClientError;
pub use guard::SessionGuardedApi;
pub use wallet_api::{SnapshotRequest, WalletApi};
