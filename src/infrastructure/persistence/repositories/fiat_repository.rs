use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};

use crate::domain::models::Fiat;
use crate::infrastructure::persistence::entities::{fiat, prelude::*};
use crate::infrastructure::persistence::error::DbError;

/// Repository for fiat exchange rates
#[derive(Debug, Clone)]
pub struct FiatRepository {
    db: DatabaseConnection,
}

impl FiatRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All rates ordered by currency code
    pub async fn find_all(&self) -> Result<Vec<Fiat>, DbError> {
        let models = FiatEntity::find()
            .order_by_asc(fiat::Column::Code)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Fiat::from).collect())
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Fiat>, DbError> {
        let model = FiatEntity::find_by_id(code.to_string()).one(&self.db).await?;
        Ok(model.map(Fiat::from))
    }
}

/// Replace the whole rate table.
///
/// An empty list is treated as a bad response and leaves the stored rates in
/// place, since dropping them would hide every asset from fiat-joined reads.
pub async fn replace_all<C: ConnectionTrait>(db: &C, fiats: &[Fiat]) -> Result<u64, DbError> {
    if fiats.is_empty() {
        tracing::warn!("Exchange rate list is empty, keeping stored rates");
        return Ok(0);
    }

    FiatEntity::delete_many().exec(db).await?;
    upsert_many(db, fiats).await
}

/// Insert or update rates by currency code
pub async fn upsert_many<C: ConnectionTrait>(db: &C, fiats: &[Fiat]) -> Result<u64, DbError> {
    if fiats.is_empty() {
        return Ok(0);
    }

    let models: Vec<fiat::ActiveModel> = fiats.iter().map(fiat::ActiveModel::from).collect();
    let rows = FiatEntity::insert_many(models)
        .on_conflict(
            OnConflict::column(fiat::Column::Code)
                .update_column(fiat::Column::Rate)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(rows)
}
