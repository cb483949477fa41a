use alloy_primitives::Address;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "eth-transfers")]
#[command(author = "quake")]
#[command(version)]
#[command(about = "Send ether and record transfers on the Transactions ledger contract")]
pub struct Args {
    /// Network to connect to (mainnet, sepolia, devnet)
    #[arg(short, long, default_value = "sepolia")]
    pub network: String,

    /// Custom RPC URL (overrides network default)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Wallet JSON-RPC URL holding the user's accounts
    #[arg(long)]
    pub wallet_url: Option<String>,

    /// Address of the deployed Transactions contract
    #[arg(long)]
    pub contract_address: Option<Address>,

    /// Data directory path
    #[arg(long)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connection state and the cached transaction count
    Status,
    /// Request account access from the wallet
    Connect,
    /// Send ether and record the transfer on the ledger
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in ether, e.g. 0.25
        #[arg(long)]
        amount: String,
        /// Keyword stored with the transfer
        #[arg(long, default_value = "")]
        keyword: String,
        /// Message stored with the transfer
        #[arg(long, default_value = "")]
        message: String,
    },
    /// List every transfer recorded by the contract
    History,
    /// Follow session state, including wallet account changes
    Watch,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
