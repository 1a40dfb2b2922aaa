//! Remote fetch, local transactional upsert, then cache invalidation.

pub mod backfill;
mod engine;

pub use backfill::Backfill;
pub use engine::{SnapshotPageSync, SyncEngine, DEFAULT_SNAPSHOT_LIMIT};
