use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use crate::domain::models::User;
use crate::infrastructure::persistence::entities::{prelude::*, user};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::BATCH_SIZE;

/// Repository for user operations
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DbError> {
        let model = UserEntity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    /// Return the subset of `user_ids` stored locally
    pub async fn existing_ids(&self, user_ids: &[String]) -> Result<Vec<String>, DbError> {
        existing_ids(&self.db, user_ids).await
    }
}

pub async fn existing_ids<C: ConnectionTrait>(
    db: &C,
    user_ids: &[String],
) -> Result<Vec<String>, DbError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = UserEntity::find()
        .select_only()
        .column(user::Column::UserId)
        .filter(user::Column::UserId.is_in(user_ids.iter().cloned()))
        .into_tuple::<String>()
        .all(db)
        .await?;

    Ok(ids)
}

/// Insert or overwrite users by user_id
pub async fn upsert_many<C: ConnectionTrait>(db: &C, users: &[User]) -> Result<u64, DbError> {
    if users.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in users.chunks(BATCH_SIZE) {
        let models: Vec<user::ActiveModel> = chunk.iter().map(user::ActiveModel::from).collect();

        total += UserEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(user::Column::UserId)
                    .update_columns([
                        user::Column::IdentityNumber,
                        user::Column::FullName,
                        user::Column::AvatarUrl,
                        user::Column::Biography,
                        user::Column::Relationship,
                        user::Column::IsVerified,
                        user::Column::CreatedAt,
                        user::Column::FiatCurrency,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}

/// Insert users that are not stored yet; existing rows are left untouched
pub async fn insert_missing<C: ConnectionTrait>(db: &C, users: &[User]) -> Result<u64, DbError> {
    if users.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in users.chunks(BATCH_SIZE) {
        let models: Vec<user::ActiveModel> = chunk.iter().map(user::ActiveModel::from).collect();

        total += UserEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(user::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}
