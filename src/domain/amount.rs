//! Conversions between decimal ether strings and 10^18 fixed-point amounts.

use alloy_primitives::{utils::parse_ether, U256};

use crate::error::{Error, Result};

/// Number of fractional digits in the fixed-point representation.
pub const DECIMALS: i32 = 18;

/// Parse a decimal ether amount (e.g. `"1.5"`) into wei.
pub fn parse_amount(amount: &str) -> Result<U256> {
    let s = amount.trim();
    if s.is_empty() {
        return Err(Error::InvalidInput("amount is required".to_string()));
    }
    if s.starts_with('-') {
        return Err(Error::InvalidInput(format!("amount {s:?} is negative")));
    }
    parse_ether(s).map_err(|e| Error::InvalidInput(format!("invalid amount {s:?}: {e}")))
}

/// Convert a wei amount to ether as a float. Large values lose precision.
pub fn wei_to_ether(wei: U256) -> f64 {
    let raw: f64 = wei.to_string().parse().unwrap_or(f64::INFINITY);
    raw / 10f64.powi(DECIMALS)
}

/// Encode a quantity as a `0x`-prefixed hex string, as JSON-RPC expects.
pub fn to_hex_quantity(value: U256) -> String {
    format!("{value:#x}")
}
