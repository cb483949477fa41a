use serde::{Deserialize, Serialize};
use strum::Display;

use crate::domain::FormField;

/// Intents a consumer can queue against a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Init,
    ConnectWallet,
    HandleChange { field: FormField, value: String },
    SendTransaction,
    GetAllTransactions,
}
