//! eth-transfers - wallet session manager for the `Transactions` ledger contract.
//!
//! This library provides:
//! - A session manager binding a wallet provider, the ledger contract and a local store
//! - A serialized command queue with observable state
//! - JSON-RPC implementations of the wallet and contract collaborators
//! - Local storage for the cached transaction count

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod session;

pub use error::{Error, Result};
pub use session::{Session, SessionHandle, SessionSettings, SessionState, SessionWorker};
