use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::domain::{FormData, TransactionRecord};

/// Coarse connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Connection {
    Disconnected,
    Connected,
}

/// Snapshot of everything a consumer can render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_account: Option<Address>,
    pub form_data: FormData,
    pub is_loading: bool,
    pub transaction_count: Option<u64>,
    pub transactions: Vec<TransactionRecord>,
}

impl SessionState {
    pub fn connection(&self) -> Connection {
        match self.current_account {
            Some(_) => Connection::Connected,
            None => Connection::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection() == Connection::Connected
    }
}
