//! Fiat exchange rate entity for SeaORM

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain::models::{amount, Fiat};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fiat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    /// Decimal string, kept as text so SQLite does not round it
    pub rate: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Fiat {
    fn from(model: Model) -> Self {
        Fiat {
            rate: amount::parse_decimal(&model.rate),
            code: model.code,
        }
    }
}

impl From<&Fiat> for ActiveModel {
    fn from(fiat: &Fiat) -> Self {
        ActiveModel {
            code: Set(fiat.code.clone()),
            rate: Set(fiat.rate.normalize().to_string()),
        }
    }
}
