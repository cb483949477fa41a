//! Wallet provider boundary.
//!
//! The session never talks to a wallet directly; it receives a
//! [`WalletProvider`] at construction so tests can substitute a mock.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::rpc::RpcClient;
use crate::{domain::amount::to_hex_quantity, error::Result};

/// Native value transfer, serialized as an `eth_sendTransaction` param.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    /// Gas limit as a hex quantity.
    pub gas: String,
    /// Value in wei as a hex quantity.
    pub value: String,
}

impl TransferRequest {
    pub fn new(from: Address, to: Address, gas_limit: u64, value: U256) -> Self {
        Self {
            from,
            to,
            gas: to_hex_quantity(U256::from(gas_limit)),
            value: to_hex_quantity(value),
        }
    }
}

/// Notification pushed by a wallet about its account set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Authorized accounts changed; the first entry is the active one.
    AccountsChanged(Vec<Address>),
    /// The wallet lost its connection.
    Disconnected,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized for this client. Never prompts.
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Ask the user to authorize accounts. May prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Submit a native value transfer and return its hash.
    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash>;
}

/// Wallet reached through the EIP-1193 method set over JSON-RPC.
pub struct JsonRpcWallet {
    rpc: RpcClient,
}

impl JsonRpcWallet {
    pub fn new(url: &str) -> Self {
        Self {
            rpc: RpcClient::new(url),
        }
    }

    /// Get the wallet URL.
    pub fn url(&self) -> &str {
        self.rpc.url()
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn accounts(&self) -> Result<Vec<Address>> {
        self.rpc.request("eth_accounts", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.rpc.request("eth_requestAccounts", json!([])).await
    }

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash> {
        self.rpc.request("eth_sendTransaction", [request]).await
    }
}
