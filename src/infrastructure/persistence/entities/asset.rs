//! Asset entity for SeaORM

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain::models::{amount, Asset};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub asset_id: String,
    pub chain_id: String,
    pub asset_key: Option<String>,
    pub mixin_id: Option<String>,
    pub symbol: String,
    pub name: String,
    pub icon_url: String,
    pub price_btc: String,
    pub change_btc: String,
    pub price_usd: String,
    pub change_usd: String,
    pub balance: String,
    pub destination: String,
    pub tag: String,
    pub confirmations: i32,
    pub reserve: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Asset {
    fn from(model: Model) -> Self {
        Asset {
            asset_id: model.asset_id,
            chain_id: model.chain_id,
            asset_key: model.asset_key,
            mixin_id: model.mixin_id,
            symbol: model.symbol,
            name: model.name,
            icon_url: model.icon_url,
            price_btc: model.price_btc,
            change_btc: model.change_btc,
            price_usd: model.price_usd,
            change_usd: model.change_usd,
            balance: model.balance,
            destination: model.destination,
            tag: model.tag,
            confirmations: model.confirmations,
            reserve: model.reserve,
        }
    }
}

impl From<&Asset> for ActiveModel {
    fn from(asset: &Asset) -> Self {
        ActiveModel {
            asset_id: Set(asset.asset_id.clone()),
            chain_id: Set(asset.chain_id.clone()),
            asset_key: Set(asset.asset_key.clone()),
            mixin_id: Set(asset.mixin_id.clone()),
            symbol: Set(asset.symbol.clone()),
            name: Set(asset.name.clone()),
            icon_url: Set(asset.icon_url.clone()),
            price_btc: Set(asset.price_btc.clone()),
            change_btc: Set(asset.change_btc.clone()),
            price_usd: Set(asset.price_usd.clone()),
            change_usd: Set(asset.change_usd.clone()),
            balance: Set(amount::normalize_balance(&asset.balance)),
            destination: Set(asset.destination.clone()),
            tag: Set(asset.tag.clone()),
            confirmations: Set(asset.confirmations),
            reserve: Set(asset.reserve.clone()),
        }
    }
}
