//! Query operations for asset repository

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::domain::models::{Asset, AssetExtra};
use crate::infrastructure::persistence::entities::{asset, asset_extra, prelude::*};
use crate::infrastructure::persistence::error::DbError;

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    asset_id: &str,
) -> Result<Option<Asset>, DbError> {
    let model = AssetEntity::find_by_id(asset_id.to_string()).one(db).await?;
    Ok(model.map(Asset::from))
}

pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Asset>, DbError> {
    let models = AssetEntity::find().all(db).await?;
    Ok(models.into_iter().map(Asset::from).collect())
}

pub async fn existing_ids<C: ConnectionTrait>(
    db: &C,
    asset_ids: &[String],
) -> Result<Vec<String>, DbError> {
    if asset_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = AssetEntity::find()
        .select_only()
        .column(asset::Column::AssetId)
        .filter(asset::Column::AssetId.is_in(asset_ids.iter().cloned()))
        .into_tuple::<String>()
        .all(db)
        .await?;

    Ok(ids)
}

pub async fn find_extra<C: ConnectionTrait>(
    db: &C,
    asset_id: &str,
) -> Result<Option<AssetExtra>, DbError> {
    let model = AssetExtraEntity::find()
        .filter(asset_extra::Column::AssetId.eq(asset_id))
        .one(db)
        .await?;
    Ok(model.map(AssetExtra::from))
}
