pub use super::asset::Entity as AssetEntity;
pub use super::asset_extra::Entity as AssetExtraEntity;
pub use super::fiat::Entity as FiatEntity;
pub use super::snapshot::Entity as SnapshotEntity;
pub use super::user::Entity as UserEntity;
