//! Read-side aggregates produced by the query composer.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Asset, Fiat, Snapshot, User};

/// An asset joined with its chain, local settings and the active fiat rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetView {
    pub asset: Asset,
    pub chain: Option<Asset>,
    pub hidden: bool,
    pub fiat: Fiat,
}

impl AssetView {
    pub fn value_usd(&self) -> Decimal {
        self.asset.value_usd()
    }

    pub fn value_fiat(&self) -> Decimal {
        self.fiat.from_usd(self.value_usd())
    }

    pub fn price_fiat(&self) -> Decimal {
        self.fiat.from_usd(self.asset.price_usd())
    }
}

/// A snapshot joined with its asset, chain, opponent and the active fiat rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotView {
    pub snapshot: Snapshot,
    pub asset: Option<Asset>,
    pub chain: Option<Asset>,
    pub opponent: Option<User>,
    pub fiat: Fiat,
}

impl SnapshotView {
    /// Current fiat value of the snapshot amount; zero when the asset is unknown
    pub fn value_fiat(&self) -> Decimal {
        match &self.asset {
            Some(asset) => self.fiat.from_usd(self.snapshot.amount() * asset.price_usd()),
            None => Decimal::ZERO,
        }
    }
}
