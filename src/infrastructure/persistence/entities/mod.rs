pub mod prelude;

pub mod asset;
pub mod asset_extra;
pub mod fiat;
pub mod snapshot;
pub mod user;
