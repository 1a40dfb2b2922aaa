use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::parse_decimal;

/// An asset as returned by the wallet API and stored locally.
///
/// Prices, changes and the balance stay decimal strings end to end; use the
/// accessor methods for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub chain_id: String,
    #[serde(default)]
    pub asset_key: Option<String>,
    #[serde(default)]
    pub mixin_id: Option<String>,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default = "zero")]
    pub price_btc: String,
    #[serde(default = "zero")]
    pub change_btc: String,
    #[serde(default = "zero")]
    pub price_usd: String,
    #[serde(default = "zero")]
    pub change_usd: String,
    #[serde(default = "zero")]
    pub balance: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub confirmations: i32,
    #[serde(default)]
    pub reserve: Option<String>,
}

fn zero() -> String {
    "0".to_string()
}

impl Asset {
    pub fn balance(&self) -> Decimal {
        parse_decimal(&self.balance)
    }

    pub fn price_usd(&self) -> Decimal {
        parse_decimal(&self.price_usd)
    }

    pub fn change_usd(&self) -> Decimal {
        parse_decimal(&self.change_usd)
    }

    pub fn value_usd(&self) -> Decimal {
        self.balance() * self.price_usd()
    }

    /// Whether the asset is its own chain asset
    pub fn is_chain(&self) -> bool {
        self.asset_id == self.chain_id
    }
}

/// User-local asset settings. Never sent by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetExtra {
    pub asset_id: String,
    pub hidden: bool,
}
