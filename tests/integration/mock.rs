//! In-memory collaborators for driving a session without a chain.

use std::{
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy_primitives::{Address, B256, TxHash, U256, address};
use async_trait::async_trait;
use tokio::sync::{mpsc::UnboundedReceiver, watch};

use eth_transfers::{
    Error, Result, Session, SessionSettings, SessionState,
    domain::RawTransaction,
    infra::{ContractClient, MemoryStore, Receipt, TransferRequest, WalletProvider},
};

pub const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const CAROL: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

pub type Failure = fn() -> Error;

/// Arm a failure slot.
pub fn failing(f: Failure) -> Option<Failure> {
    Some(f)
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wallet with a fixed account set that records every transfer.
#[derive(Default)]
pub struct MockWallet {
    pub authorized: Mutex<Vec<Address>>,
    pub requestable: Mutex<Vec<Address>>,
    pub transfers: Mutex<Vec<TransferRequest>>,
    pub fail_request: Mutex<Option<Failure>>,
    pub fail_transfer: Mutex<Option<Failure>>,
    pub accounts_calls: AtomicUsize,
}

impl MockWallet {
    /// Wallet that has not authorized anything yet but grants `accounts` on request.
    pub fn granting(accounts: Vec<Address>) -> Self {
        Self {
            requestable: Mutex::new(accounts),
            ..Self::default()
        }
    }

    /// Wallet that already authorized `accounts`.
    pub fn authorized(accounts: Vec<Address>) -> Self {
        Self {
            authorized: Mutex::new(accounts.clone()),
            requestable: Mutex::new(accounts),
            ..Self::default()
        }
    }

    pub fn set_authorized(&self, accounts: Vec<Address>) {
        *lock(&self.authorized) = accounts;
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        lock(&self.transfers).clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn accounts(&self) -> Result<Vec<Address>> {
        self.accounts_calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.authorized).clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if let Some(fail) = *lock(&self.fail_request) {
            return Err(fail());
        }
        let granted = lock(&self.requestable).clone();
        *lock(&self.authorized) = granted.clone();
        Ok(granted)
    }

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash> {
        if let Some(fail) = *lock(&self.fail_transfer) {
            return Err(fail());
        }
        let mut transfers = lock(&self.transfers);
        transfers.push(request);
        Ok(B256::with_last_byte(transfers.len() as u8))
    }
}

/// A write recorded by [`MockContract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub from: Address,
    pub receiver: Address,
    pub amount: U256,
    pub message: String,
    pub keyword: String,
}

/// Ledger contract kept in memory.
pub struct MockContract {
    pub ledger: Mutex<Vec<RawTransaction>>,
    pub writes: Mutex<Vec<Write>>,
    pub fail_count: Mutex<Option<Failure>>,
    pub fail_write: Mutex<Option<Failure>>,
    pub fail_wait: Mutex<Option<Failure>>,
    pub wait_delay: Duration,
    pub fetches: AtomicUsize,
    /// Loading flag observed while a receipt is awaited.
    pub loading_during_wait: Mutex<Vec<bool>>,
    pub probe: OnceLock<watch::Receiver<SessionState>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockContract {
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fail_count: Mutex::new(None),
            fail_write: Mutex::new(None),
            fail_wait: Mutex::new(None),
            wait_delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            loading_during_wait: Mutex::new(Vec::new()),
            probe: OnceLock::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_wait_delay(mut self, delay: Duration) -> Self {
        self.wait_delay = delay;
        self
    }

    pub fn with_ledger(self, ledger: Vec<RawTransaction>) -> Self {
        *lock(&self.ledger) = ledger;
        self
    }

    /// Let the contract observe session state during receipt waits.
    pub fn watch(&self, session: &Session) {
        let _ = self.probe.set(session.subscribe());
    }

    pub fn writes(&self) -> Vec<Write> {
        lock(&self.writes).clone()
    }

    pub fn loading_during_wait(&self) -> Vec<bool> {
        lock(&self.loading_during_wait).clone()
    }
}

#[async_trait]
impl ContractClient for MockContract {
    async fn get_all_transactions(&self) -> Result<Vec<RawTransaction>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.ledger).clone())
    }

    async fn get_transaction_count(&self) -> Result<u64> {
        if let Some(fail) = *lock(&self.fail_count) {
            return Err(fail());
        }
        Ok(lock(&self.ledger).len() as u64)
    }

    async fn add_to_blockchain(
        &self,
        from: Address,
        receiver: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<TxHash> {
        if let Some(fail) = *lock(&self.fail_write) {
            return Err(fail());
        }
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        lock(&self.writes).push(Write {
            from,
            receiver,
            amount,
            message: message.to_string(),
            keyword: keyword.to_string(),
        });
        let mut ledger = lock(&self.ledger);
        let len = ledger.len() as u64;
        ledger.push(RawTransaction {
            sender: from,
            receiver,
            amount,
            message: message.to_string(),
            timestamp: U256::from(1_700_000_000 + len),
            keyword: keyword.to_string(),
        });
        Ok(B256::with_last_byte(0x80 | (len + 1) as u8))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        if let Some(probe) = self.probe.get() {
            lock(&self.loading_during_wait).push(probe.borrow().is_loading);
        }
        if !self.wait_delay.is_zero() {
            tokio::time::sleep(self.wait_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(fail) = *lock(&self.fail_wait) {
            return Err(fail());
        }
        Ok(Receipt {
            hash,
            block_number: Some(1),
            success: true,
        })
    }
}

pub struct Harness {
    pub session: Session,
    pub alerts: UnboundedReceiver<String>,
    pub wallet: Option<Arc<MockWallet>>,
    pub contract: Arc<MockContract>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(wallet: Option<MockWallet>, contract: MockContract) -> Self {
        Self::with_store(wallet, contract, MemoryStore::new())
    }

    pub fn with_store(wallet: Option<MockWallet>, contract: MockContract, store: MemoryStore) -> Self {
        let wallet = wallet.map(Arc::new);
        let contract = Arc::new(contract);
        let store = Arc::new(store);

        let (session, alerts) = Session::new(
            wallet.clone().map(|w| w as Arc<dyn WalletProvider>),
            contract.clone(),
            store.clone(),
            SessionSettings::default(),
        );
        contract.watch(&session);

        Self {
            session,
            alerts,
            wallet,
            contract,
            store,
        }
    }

    pub fn wallet(&self) -> &MockWallet {
        self.wallet.as_deref().expect("harness has a wallet")
    }

    pub fn drain_alerts(&mut self) -> Vec<String> {
        let mut alerts = Vec::new();
        while let Ok(alert) = self.alerts.try_recv() {
            alerts.push(alert);
        }
        alerts
    }
}

pub fn raw_transfer(sender: Address, receiver: Address, wei: u128, timestamp: u64) -> RawTransaction {
    RawTransaction {
        sender,
        receiver,
        amount: U256::from(wei),
        message: format!("paid {wei}"),
        timestamp: U256::from(timestamp),
        keyword: "test".to_string(),
    }
}
