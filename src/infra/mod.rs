pub mod contract;
pub mod rpc;
pub mod store;
pub mod watcher;
pub mod wallet;

pub use contract::{ContractClient, PendingTransaction, Receipt, TransactionsContract};
pub use store::{LocalStore, MemoryStore, Store};
pub use watcher::AccountWatcher;
pub use wallet::{JsonRpcWallet, TransferRequest, WalletEvent, WalletProvider};
