pub mod cache;
pub mod feed;
pub mod inflight;
pub mod query;
pub mod sync;
pub mod wallet;

pub use feed::SnapshotFeed;
pub use wallet::Wallet;
