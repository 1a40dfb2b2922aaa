use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};

use crate::domain::models::Snapshot;
use crate::infrastructure::persistence::entities::{prelude::*, snapshot};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::BATCH_SIZE;

/// Repository for snapshot operations
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    db: DatabaseConnection,
}

impl SnapshotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, snapshot_id: &str) -> Result<Option<Snapshot>, DbError> {
        let model = SnapshotEntity::find_by_id(snapshot_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Snapshot::from))
    }
}

/// Insert or overwrite snapshots by snapshot_id
pub async fn upsert_many<C: ConnectionTrait>(
    db: &C,
    snapshots: &[Snapshot],
) -> Result<u64, DbError> {
    if snapshots.is_empty() {
        return Ok(0);
    }

    let mut total = 0u64;
    for chunk in snapshots.chunks(BATCH_SIZE) {
        let models: Vec<snapshot::ActiveModel> =
            chunk.iter().map(snapshot::ActiveModel::from).collect();

        total += SnapshotEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(snapshot::Column::SnapshotId)
                    .update_columns([
                        snapshot::Column::SnapshotType,
                        snapshot::Column::AssetId,
                        snapshot::Column::OpponentId,
                        snapshot::Column::UserId,
                        snapshot::Column::Amount,
                        snapshot::Column::CreatedAt,
                        snapshot::Column::Memo,
                        snapshot::Column::TraceId,
                        snapshot::Column::Sender,
                        snapshot::Column::Receiver,
                        snapshot::Column::TransactionHash,
                        snapshot::Column::OpeningBalance,
                        snapshot::Column::ClosingBalance,
                        snapshot::Column::Confirmations,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(total)
}
