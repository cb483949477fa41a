//! Transaction ledger records.

use alloy_primitives::{Address, U256};
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::amount::wei_to_ether;

/// A transfer as stored by the ledger contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: Address,
    pub receiver: Address,
    /// Amount in wei.
    pub amount: U256,
    pub message: String,
    /// Block timestamp in seconds since the epoch.
    pub timestamp: U256,
    pub keyword: String,
}

/// A ledger entry prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Receiver address.
    pub address: Address,
    /// Sender address.
    pub address_from: Address,
    pub timestamp: String,
    pub message: String,
    pub keyword: String,
    /// Amount in ether.
    pub amount: f64,
}

impl TransactionRecord {
    /// Build a record, rendering the timestamp in the given zone.
    pub fn from_raw_in<Tz>(raw: RawTransaction, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            address: raw.receiver,
            address_from: raw.sender,
            timestamp: format_timestamp_in(raw.timestamp, tz),
            message: raw.message,
            keyword: raw.keyword,
            amount: wei_to_ether(raw.amount),
        }
    }
}

impl From<RawTransaction> for TransactionRecord {
    fn from(raw: RawTransaction) -> Self {
        Self::from_raw_in(raw, &Local)
    }
}

/// Render on-chain seconds as `M/D/YYYY, h:mm:ss AM` in the local zone.
pub fn format_timestamp(seconds: U256) -> String {
    format_timestamp_in(seconds, &Local)
}

/// Render on-chain seconds as `M/D/YYYY, h:mm:ss AM` in `tz`.
///
/// Out-of-range instants fall back to the raw seconds value.
pub fn format_timestamp_in<Tz>(seconds: U256, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let millis = u64::try_from(seconds)
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| secs.checked_mul(1000));

    match millis.and_then(|ms| tz.timestamp_millis_opt(ms).single()) {
        Some(datetime) => datetime.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => seconds.to_string(),
    }
}
