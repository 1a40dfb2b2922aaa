pub mod asset;
pub mod fiat_repository;
pub mod snapshot_repository;
pub mod user_repository;

pub use asset::AssetRepository;
pub use fiat_repository::FiatRepository;
pub use snapshot_repository::SnapshotRepository;
pub use user_repository::UserRepository;

use sea_orm::DatabaseConnection;

/// Rows written per INSERT statement
pub(crate) const BATCH_SIZE: usize = 100;

/// Collection of all repositories
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Repository for asset and asset_extra operations
    pub asset: AssetRepository,
    /// Repository for fiat rate operations
    pub fiat: FiatRepository,
    /// Repository for snapshot operations
    pub snapshot: SnapshotRepository,
    /// Repository for user operations
    pub user: UserRepository,
}

impl Repositories {
    /// Create every repository over one shared connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            asset: AssetRepository::new(db.clone()),
            fiat: FiatRepository::new(db.clone()),
            snapshot: SnapshotRepository::new(db.clone()),
            user: UserRepository::new(db),
        }
    }
}
