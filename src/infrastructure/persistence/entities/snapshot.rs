//! Snapshot entity for SeaORM

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::domain::models::{Snapshot, SnapshotType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snapshot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub snapshot_id: String,
    #[sea_orm(column_name = "type")]
    pub snapshot_type: String,
    pub asset_id: String,
    pub opponent_id: Option<String>,
    pub user_id: Option<String>,
    pub amount: String,
    pub created_at: String,
    pub memo: String,
    pub trace_id: String,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub transaction_hash: Option<String>,
    pub opening_balance: Option<String>,
    pub closing_balance: Option<String>,
    pub confirmations: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Snapshot {
    fn from(model: Model) -> Self {
        Snapshot {
            snapshot_id: model.snapshot_id,
            snapshot_type: SnapshotType::parse(&model.snapshot_type),
            asset_id: model.asset_id,
            opponent_id: model.opponent_id,
            user_id: model.user_id,
            amount: model.amount,
            created_at: model.created_at,
            memo: model.memo,
            trace_id: model.trace_id,
            sender: model.sender,
            receiver: model.receiver,
            transaction_hash: model.transaction_hash,
            opening_balance: model.opening_balance,
            closing_balance: model.closing_balance,
            confirmations: model.confirmations,
        }
    }
}

impl From<&Snapshot> for ActiveModel {
    fn from(snapshot: &Snapshot) -> Self {
        ActiveModel {
            snapshot_id: Set(snapshot.snapshot_id.clone()),
            snapshot_type: Set(snapshot.snapshot_type.as_str().to_string()),
            asset_id: Set(snapshot.asset_id.clone()),
            opponent_id: Set(snapshot.opponent_id.clone().filter(|id| !id.is_empty())),
            user_id: Set(snapshot.user_id.clone().filter(|id| !id.is_empty())),
            amount: Set(snapshot.amount.clone()),
            created_at: Set(snapshot.created_at.clone()),
            memo: Set(snapshot.memo.clone()),
            trace_id: Set(snapshot.trace_id.clone()),
            sender: Set(snapshot.sender.clone()),
            receiver: Set(snapshot.receiver.clone()),
            transaction_hash: Set(snapshot.transaction_hash.clone()),
            opening_balance: Set(snapshot.opening_balance.clone()),
            closing_balance: Set(snapshot.closing_balance.clone()),
            confirmations: Set(snapshot.confirmations),
        }
    }
}
