use std::fmt;

use crate::application::query::{AssetQuery, SnapshotFilter};

/// Groups of cached queries invalidated together after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Asset,
    Snapshot,
    User,
    Fiat,
    Ticker,
    TopAssetId,
}

impl QueryFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryFamily::Asset => "asset",
            QueryFamily::Snapshot => "snapshot",
            QueryFamily::User => "user",
            QueryFamily::Fiat => "fiat",
            QueryFamily::Ticker => "ticker",
            QueryFamily::TopAssetId => "topAssetId",
        }
    }
}

impl fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed cache key. Fiat-joined reads carry the currency they were run under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Assets {
        currency: String,
        query: AssetQuery,
    },
    Asset {
        currency: String,
        asset_id: String,
    },
    SnapshotPage {
        currency: String,
        filter: SnapshotFilter,
        cursor: Option<String>,
        limit: u64,
    },
    Snapshot {
        currency: String,
        snapshot_id: String,
    },
    User {
        user_id: String,
    },
    Fiats,
    Ticker {
        asset_id: String,
        at: Option<String>,
    },
    TopAssetIds,
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::Assets { .. } | QueryKey::Asset { .. } => QueryFamily::Asset,
            QueryKey::SnapshotPage { .. } | QueryKey::Snapshot { .. } => QueryFamily::Snapshot,
            QueryKey::User { .. } => QueryFamily::User,
            QueryKey::Fiats => QueryFamily::Fiat,
            QueryKey::Ticker { .. } => QueryFamily::Ticker,
            QueryKey::TopAssetIds => QueryFamily::TopAssetId,
        }
    }
}
