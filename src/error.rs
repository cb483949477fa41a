//! Error type shared by the session manager and its collaborators.

use thiserror::Error;

/// EIP-1193 code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code for a method or account the wallet has not authorized.
pub const UNAUTHORIZED_CODE: i64 = 4100;

/// JSON-RPC code geth and anvil use for `execution reverted` with data.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// Generic JSON-RPC server error code, also used by nodes for reverts.
pub const SERVER_ERROR_CODE: i64 = -32000;

/// Errors surfaced by session operations.
///
/// `ProviderMissing` is the only non-fatal variant: the operation is skipped
/// after alerting the user and the session stays usable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no wallet provider available")]
    ProviderMissing,

    #[error("request rejected by user: {0}")]
    UserRejected(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("contract reverted: {0}")]
    ContractReverted(String),

    #[error("wallet is not connected")]
    NotConnected,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("local store error: {0}")]
    Store(#[from] heed::Error),

    #[error("{0}")]
    Unknown(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Whether the caller should abandon the current operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ProviderMissing)
    }

    /// Classify a JSON-RPC error object returned by a wallet or node.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        match code {
            USER_REJECTED_CODE => Error::UserRejected(message.to_string()),
            UNAUTHORIZED_CODE => Error::NotConnected,
            EXECUTION_REVERTED_CODE => Error::ContractReverted(message.to_string()),
            SERVER_ERROR_CODE if message.contains("revert") => {
                Error::ContractReverted(message.to_string())
            }
            _ => Error::Unknown(format!("rpc error {code}: {message}")),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkFailure(err.to_string())
    }
}

impl From<alloy_sol_types::Error> for Error {
    fn from(err: alloy_sol_types::Error) -> Self {
        Error::Unknown(format!("abi decode failed: {err}"))
    }
}
