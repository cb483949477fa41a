use std::{path::PathBuf, time::Duration};

use alloy_primitives::{address, Address};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default local store key holding the cached on-chain transaction count.
pub const TRANSACTION_COUNT_KEY: &str = "transactionCount";

/// Gas limit for a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("ETH_TRANSFERS_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "eth-transfers", "eth-transfers") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    /// Node used for contract reads and receipts.
    pub rpc_url: String,
    /// Wallet endpoint holding the user's accounts. `None` means no wallet
    /// provider is present.
    pub wallet_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Address of the deployed `Transactions` contract.
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key used for both reading and writing the cached transaction count.
    pub transaction_count_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between `eth_getTransactionReceipt` polls.
    pub receipt_interval_ms: u64,
    /// Interval between `eth_accounts` polls when watching for account changes.
    pub accounts_interval_ms: u64,
}

impl PollingConfig {
    pub fn receipt_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_interval_ms)
    }

    pub fn accounts_interval(&self) -> Duration {
        Duration::from_millis(self.accounts_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    pub store: StoreConfig,
    pub polling: PollingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::sepolia()
    }
}

impl Config {
    /// Create config from CLI args.
    pub fn new(
        network: &str,
        rpc_url: Option<&str>,
        wallet_url: Option<&str>,
        contract_address: Option<Address>,
    ) -> Self {
        let mut config = Self::from_network(network);
        if let Some(url) = rpc_url {
            // A node that also serves accounts (devnet) keeps doing so at the new URL
            if config.network.wallet_url.as_deref() == Some(config.network.rpc_url.as_str()) {
                config.network.wallet_url = Some(url.to_string());
            }
            config.network.rpc_url = url.to_string();
        }
        if let Some(url) = wallet_url {
            config.network.wallet_url = Some(url.to_string());
        }
        if let Some(address) = contract_address {
            config.contract.address = address;
        }
        config
    }

    pub fn mainnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "mainnet".to_string(),
                chain_id: 1,
                rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
                wallet_url: None,
            },
            contract: ContractConfig {
                address: Address::ZERO,
            },
            store: StoreConfig::default(),
            polling: PollingConfig {
                receipt_interval_ms: 4_000,
                accounts_interval_ms: 2_000,
            },
        }
    }

    pub fn sepolia() -> Self {
        Self {
            network: NetworkConfig {
                name: "sepolia".to_string(),
                chain_id: 11_155_111,
                rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
                wallet_url: None,
            },
            contract: ContractConfig {
                address: Address::ZERO,
            },
            store: StoreConfig::default(),
            polling: PollingConfig {
                receipt_interval_ms: 4_000,
                accounts_interval_ms: 2_000,
            },
        }
    }

    pub fn devnet() -> Self {
        Self {
            network: NetworkConfig {
                name: "devnet".to_string(),
                chain_id: 31_337,
                rpc_url: "http://127.0.0.1:8545".to_string(),
                // Local dev nodes hold unlocked accounts and serve as the wallet
                wallet_url: Some("http://127.0.0.1:8545".to_string()),
            },
            contract: ContractConfig {
                // First contract deployed by the default dev account
                address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            },
            store: StoreConfig::default(),
            polling: PollingConfig {
                receipt_interval_ms: 250,
                accounts_interval_ms: 1_000,
            },
        }
    }

    /// Reject a config that has no deployed contract to talk to.
    pub fn validate(&self) -> Result<()> {
        if self.contract.address == Address::ZERO {
            return Err(Error::InvalidInput(format!(
                "no contract address configured for {}, pass --contract-address",
                self.network.name
            )));
        }
        Ok(())
    }

    pub fn from_network(network: &str) -> Self {
        match network {
            "mainnet" => Self::mainnet(),
            "devnet" => Self::devnet(),
            _ => Self::sepolia(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            transaction_count_key: TRANSACTION_COUNT_KEY.to_string(),
        }
    }
}
