use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency used when the profile does not name one
pub const DEFAULT_FIAT_CURRENCY: &str = "USD";

/// Exchange rate of a fiat currency against USD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fiat {
    pub code: String,
    pub rate: Decimal,
}

impl Fiat {
    pub fn usd() -> Self {
        Self {
            code: DEFAULT_FIAT_CURRENCY.to_string(),
            rate: Decimal::ONE,
        }
    }

    /// Convert a USD amount into this currency
    pub fn from_usd(&self, usd: Decimal) -> Decimal {
        usd * self.rate
    }
}
