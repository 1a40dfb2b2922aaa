//! User-local asset settings

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::models::AssetExtra;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_extra")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub asset_id: String,
    pub hidden: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AssetExtra {
    fn from(model: Model) -> Self {
        AssetExtra {
            asset_id: model.asset_id,
            hidden: model.hidden,
        }
    }
}
