//! Write operations for asset repository.
//!
//! Every function is generic over [`ConnectionTrait`] so it can run on the
//! pool or inside the caller's transaction.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::domain::models::Asset;
use crate::infrastructure::persistence::entities::{asset, asset_extra, prelude::*};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::BATCH_SIZE;

/// Columns refreshed from network-wide listings, which carry no balance
const MARKET_COLUMNS: [asset::Column; 8] = [
    asset::Column::ChainId,
    asset::Column::Symbol,
    asset::Column::Name,
    asset::Column::IconUrl,
    asset::Column::PriceBtc,
    asset::Column::ChangeBtc,
    asset::Column::PriceUsd,
    asset::Column::ChangeUsd,
];

/// Set every stored balance to zero ahead of a full resync
pub async fn zero_all_balances<C: ConnectionTrait>(db: &C) -> Result<u64, DbError> {
    let result = AssetEntity::update_many()
        .col_expr(asset::Column::Balance, Expr::value("0"))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Insert or fully overwrite assets by asset_id
pub async fn upsert_many<C: ConnectionTrait>(db: &C, assets: &[Asset]) -> Result<u64, DbError> {
    if assets.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in assets.chunks(BATCH_SIZE) {
        let models: Vec<asset::ActiveModel> = chunk.iter().map(asset::ActiveModel::from).collect();

        total += AssetEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(asset::Column::AssetId)
                    .update_columns([
                        asset::Column::ChainId,
                        asset::Column::AssetKey,
                        asset::Column::MixinId,
                        asset::Column::Symbol,
                        asset::Column::Name,
                        asset::Column::IconUrl,
                        asset::Column::PriceBtc,
                        asset::Column::ChangeBtc,
                        asset::Column::PriceUsd,
                        asset::Column::ChangeUsd,
                        asset::Column::Balance,
                        asset::Column::Destination,
                        asset::Column::Tag,
                        asset::Column::Confirmations,
                        asset::Column::Reserve,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}

/// Store market data without touching balances.
///
/// Unknown assets are inserted with a zero balance; known ones only get
/// their market columns refreshed.
pub async fn upsert_market_data<C: ConnectionTrait>(
    db: &C,
    assets: &[Asset],
) -> Result<u64, DbError> {
    if assets.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in assets.chunks(BATCH_SIZE) {
        let models: Vec<asset::ActiveModel> = chunk
            .iter()
            .map(|a| {
                let mut model = asset::ActiveModel::from(a);
                model.balance = Set("0".to_string());
                model
            })
            .collect();

        total += AssetEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(asset::Column::AssetId)
                    .update_columns(MARKET_COLUMNS)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}

/// Insert assets that are not stored yet; existing rows are left untouched
pub async fn insert_missing<C: ConnectionTrait>(db: &C, assets: &[Asset]) -> Result<u64, DbError> {
    if assets.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in assets.chunks(BATCH_SIZE) {
        let models: Vec<asset::ActiveModel> = chunk.iter().map(asset::ActiveModel::from).collect();

        total += AssetEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(asset::Column::AssetId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}

pub async fn set_hidden<C: ConnectionTrait>(
    db: &C,
    asset_id: &str,
    hidden: bool,
) -> Result<(), DbError> {
    let model = asset_extra::ActiveModel {
        asset_id: Set(asset_id.to_string()),
        hidden: Set(hidden),
    };

    AssetExtraEntity::insert(model)
        .on_conflict(
            OnConflict::column(asset_extra::Column::AssetId)
                .update_column(asset_extra::Column::Hidden)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}
