//! Client for the deployed `Transactions` ledger contract.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::rpc::RpcClient;
use crate::{
    domain::RawTransaction,
    error::{Error, Result},
};

sol! {
    interface Transactions {
        struct TransferStruct {
            address sender;
            address receiver;
            uint256 amount;
            string message;
            uint256 timestamp;
            string keyword;
        }

        function addToBlockchain(address receiver, uint256 amount, string message, string keyword) external;
        function getAllTransactions() external view returns (TransferStruct[] memory);
        function getTransactionCount() external view returns (uint256);
    }
}

impl From<Transactions::TransferStruct> for RawTransaction {
    fn from(t: Transactions::TransferStruct) -> Self {
        Self {
            sender: t.sender,
            receiver: t.receiver,
            amount: t.amount,
            message: t.message,
            timestamp: t.timestamp,
            keyword: t.keyword,
        }
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
}

#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Every transfer recorded by the contract, in insertion order.
    async fn get_all_transactions(&self) -> Result<Vec<RawTransaction>>;

    async fn get_transaction_count(&self) -> Result<u64>;

    /// Submit `addToBlockchain` from `from` and return the transaction hash.
    async fn add_to_blockchain(
        &self,
        from: Address,
        receiver: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<TxHash>;

    /// Block until the transaction is mined. Reverted transactions are errors.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt>;
}

/// Handle to a submitted contract write.
pub struct PendingTransaction<'a> {
    hash: TxHash,
    client: &'a dyn ContractClient,
}

impl<'a> PendingTransaction<'a> {
    pub fn new(client: &'a dyn ContractClient, hash: TxHash) -> Self {
        Self { hash, client }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for the transaction to be mined.
    pub async fn wait(self) -> Result<Receipt> {
        self.client.wait_for_receipt(self.hash).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    block_number: Option<U64>,
    status: Option<U64>,
}

/// [`ContractClient`] speaking JSON-RPC: reads go to a node, writes are
/// signed by the wallet endpoint.
pub struct TransactionsContract {
    address: Address,
    reader: RpcClient,
    signer: Option<RpcClient>,
    poll_interval: Duration,
}

impl TransactionsContract {
    pub fn new(
        address: Address,
        rpc_url: &str,
        wallet_url: Option<&str>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            address,
            reader: RpcClient::new(rpc_url),
            signer: wallet_url.map(RpcClient::new),
            poll_interval,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let params = json!([
            { "to": self.address, "data": Bytes::from(call.abi_encode()) },
            "latest"
        ]);
        let data: Bytes = self.reader.request("eth_call", params).await?;
        Ok(C::abi_decode_returns(&data, true)?)
    }

    fn write_request<C: SolCall>(&self, from: Address, call: &C) -> serde_json::Value {
        json!({
            "from": from,
            "to": self.address,
            "data": format!("0x{}", hex::encode(call.abi_encode())),
        })
    }
}

#[async_trait]
impl ContractClient for TransactionsContract {
    async fn get_all_transactions(&self) -> Result<Vec<RawTransaction>> {
        let ret = self.call(Transactions::getAllTransactionsCall {}).await?;
        Ok(ret._0.into_iter().map(RawTransaction::from).collect())
    }

    async fn get_transaction_count(&self) -> Result<u64> {
        let ret = self.call(Transactions::getTransactionCountCall {}).await?;
        u64::try_from(ret._0)
            .map_err(|_| Error::Unknown(format!("transaction count {} overflows u64", ret._0)))
    }

    async fn add_to_blockchain(
        &self,
        from: Address,
        receiver: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<TxHash> {
        let signer = self.signer.as_ref().ok_or(Error::ProviderMissing)?;

        let call = Transactions::addToBlockchainCall {
            receiver,
            amount,
            message: message.to_string(),
            keyword: keyword.to_string(),
        };
        let tx = self.write_request(from, &call);
        let hash: TxHash = signer.request("eth_sendTransaction", [tx]).await?;
        info!("addToBlockchain submitted: {}", hash);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        loop {
            let receipt: Option<RpcReceipt> = self
                .reader
                .request("eth_getTransactionReceipt", [hash])
                .await?;

            if let Some(receipt) = receipt {
                // Pre-Byzantium receipts carry no status; treat them as success
                let success = receipt.status.map_or(true, |s| s == U64::from(1));
                let receipt = Receipt {
                    hash: receipt.transaction_hash,
                    block_number: receipt.block_number.map(|n| n.to::<u64>()),
                    success,
                };
                if !receipt.success {
                    return Err(Error::ContractReverted(format!(
                        "transaction {hash} reverted"
                    )));
                }
                return Ok(receipt);
            }

            debug!("receipt for {} not yet available", hash);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
