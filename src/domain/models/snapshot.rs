use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::amount::parse_decimal;

/// Kind of balance change a snapshot records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotType {
    Deposit,
    Withdrawal,
    Transfer,
    Pending,
    Fee,
    Rebate,
    #[serde(other)]
    Raw,
}

impl SnapshotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotType::Deposit => "deposit",
            SnapshotType::Withdrawal => "withdrawal",
            SnapshotType::Transfer => "transfer",
            SnapshotType::Pending => "pending",
            SnapshotType::Fee => "fee",
            SnapshotType::Rebate => "rebate",
            SnapshotType::Raw => "raw",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "deposit" => SnapshotType::Deposit,
            "withdrawal" => SnapshotType::Withdrawal,
            "transfer" => SnapshotType::Transfer,
            "pending" => SnapshotType::Pending,
            "fee" => SnapshotType::Fee,
            "rebate" => SnapshotType::Rebate,
            _ => SnapshotType::Raw,
        }
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an asset's transaction history.
///
/// Snapshots never change remotely once created, so they are upserted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
    #[serde(rename = "type")]
    pub snapshot_type: SnapshotType,
    pub asset_id: String,
    #[serde(default)]
    pub opponent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub amount: String,
    pub created_at: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub opening_balance: Option<String>,
    #[serde(default)]
    pub closing_balance: Option<String>,
    #[serde(default)]
    pub confirmations: Option<i32>,
}

impl Snapshot {
    pub fn amount(&self) -> Decimal {
        parse_decimal(&self.amount)
    }

    pub fn created_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Users this snapshot references, deduplicated
    pub fn referenced_user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in [&self.opponent_id, &self.user_id].into_iter().flatten() {
            if !id.is_empty() && !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}
