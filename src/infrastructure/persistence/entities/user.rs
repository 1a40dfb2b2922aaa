//! User entity for SeaORM

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain::models::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub identity_number: String,
    pub full_name: String,
    pub avatar_url: String,
    pub biography: String,
    pub relationship: String,
    pub is_verified: bool,
    pub created_at: String,
    pub fiat_currency: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            user_id: model.user_id,
            identity_number: model.identity_number,
            full_name: model.full_name,
            avatar_url: model.avatar_url,
            biography: model.biography,
            relationship: model.relationship,
            is_verified: model.is_verified,
            created_at: model.created_at,
            fiat_currency: model.fiat_currency,
        }
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            user_id: Set(user.user_id.clone()),
            identity_number: Set(user.identity_number.clone()),
            full_name: Set(user.full_name.clone()),
            avatar_url: Set(user.avatar_url.clone()),
            biography: Set(user.biography.clone()),
            relationship: Set(user.relationship.clone()),
            is_verified: Set(user.is_verified),
            created_at: Set(user.created_at.clone()),
            fiat_currency: Set(user.fiat_currency.clone()),
        }
    }
}
