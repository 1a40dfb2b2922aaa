//! Decimal helpers for the string amounts the wallet API returns.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an API decimal string.
///
/// Empty, malformed or out-of-range input reads as zero, the same way the
/// wallet renders such values.
pub fn parse_decimal(value: &str) -> Decimal {
    let value = value.trim();
    if value.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .unwrap_or(Decimal::ZERO)
}

/// Normalize a balance to a non-negative decimal string.
pub fn normalize_balance(value: &str) -> String {
    let parsed = parse_decimal(value);
    if parsed.is_sign_negative() || parsed.is_zero() {
        "0".to_string()
    } else {
        parsed.normalize().to_string()
    }
}
