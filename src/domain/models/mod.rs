pub mod amount;
pub mod asset;
pub mod fiat;
pub mod snapshot;
pub mod ticker;
pub mod user;
pub mod views;

pub use asset::{Asset, AssetExtra};
pub use fiat::{Fiat, DEFAULT_FIAT_CURRENCY};
pub use snapshot::{Snapshot, SnapshotType};
pub use ticker::Ticker;
pub use user::User;
pub use views::{AssetView, SnapshotView};
