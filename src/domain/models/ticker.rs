use serde::{Deserialize, Serialize};

/// Historical price of an asset at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(default)]
    pub price_usd: String,
    #[serde(default)]
    pub price_btc: String,
}
