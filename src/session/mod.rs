//! Wallet/contract session manager.
//!
//! A [`Session`] binds an injected wallet provider, the ledger contract
//! client and a local store into one observable [`SessionState`]. Intents
//! (`connect_wallet`, `handle_change`, `send_transaction`) mutate the state and
//! call the collaborators; consumers watch the state through [`Session::subscribe`].

mod command;
mod state;
mod worker;

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch, Mutex,
};
use tracing::{debug, error, info, warn};

pub use command::Command;
pub use state::{Connection, SessionState};
pub use worker::{SessionHandle, SessionWorker};

use crate::{
    config::{Config, TRANSACTION_COUNT_KEY, TRANSFER_GAS_LIMIT},
    domain::{amount::parse_amount, FormField, TransactionRecord},
    error::{Error, Result},
    infra::{
        ContractClient, LocalStore, PendingTransaction, TransferRequest, WalletEvent,
        WalletProvider,
    },
};

/// Alert shown to the user when no wallet provider is available.
pub const INSTALL_WALLET_ALERT: &str = "Please install a wallet provider";

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Local store key for the cached transaction count, used for reads and writes.
    pub transaction_count_key: String,
    /// Gas limit attached to the native value transfer.
    pub gas_limit: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            transaction_count_key: TRANSACTION_COUNT_KEY.to_string(),
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            transaction_count_key: config.store.transaction_count_key.clone(),
            ..Self::default()
        }
    }
}

pub struct Session {
    wallet: Option<Arc<dyn WalletProvider>>,
    contract: Arc<dyn ContractClient>,
    store: Arc<dyn LocalStore>,
    settings: SessionSettings,
    state: watch::Sender<SessionState>,
    alerts: UnboundedSender<String>,
    send_lock: Mutex<()>,
}

impl Session {
    /// Create a session. `wallet` is `None` when no provider is present.
    ///
    /// Returns the session and the receiving end of its user-facing alerts.
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        contract: Arc<dyn ContractClient>,
        store: Arc<dyn LocalStore>,
        settings: SessionSettings,
    ) -> (Self, UnboundedReceiver<String>) {
        let transaction_count = load_transaction_count(store.as_ref(), &settings);
        let (state, _) = watch::channel(SessionState {
            transaction_count,
            ..SessionState::default()
        });
        let (alerts, alerts_rx) = mpsc::unbounded_channel();

        let session = Self {
            wallet,
            contract,
            store,
            settings,
            state,
            alerts,
            send_lock: Mutex::new(()),
        };
        (session, alerts_rx)
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Run the startup checks: silent re-authorization, then the on-chain count.
    ///
    /// Both checks are attempted. A fatal failure from either wins over a
    /// non-fatal one; otherwise the first failure is returned.
    pub async fn init(&self) -> Result<()> {
        let wallet = self.check_if_wallet_is_connected().await;
        let count = self.check_if_transactions_exist().await;
        match (wallet, count) {
            (Ok(()), count) => count,
            (Err(e), Err(fatal)) if !e.is_fatal() && fatal.is_fatal() => Err(fatal),
            (Err(e), _) => Err(e),
        }
    }

    /// Ask the wallet for account access and adopt the first account.
    pub async fn connect_wallet(&self) -> Result<()> {
        let wallet = self.wallet()?;
        let accounts = wallet
            .request_accounts()
            .await
            .inspect_err(|e| error!("Failed to connect wallet: {}", e))?;

        match accounts.first() {
            Some(&account) => {
                info!("Connected account {}", account);
                self.set_account(Some(account));
                Ok(())
            }
            None => {
                error!("Wallet authorized no accounts");
                Err(Error::NotConnected)
            }
        }
    }

    /// Update one form field.
    pub fn handle_change(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| s.form_data.set(field, value));
    }

    /// Send the form amount to the form recipient and record it on the ledger.
    ///
    /// Calls are serialized; a second caller waits for the first to finish.
    /// A failure after the native transfer leaves that transfer in place.
    pub async fn send_transaction(&self) -> Result<()> {
        let _guard = self.send_lock.lock().await;
        self.send_transaction_inner()
            .await
            .inspect_err(|e| error!("Failed to send transaction: {}", e))
    }

    async fn send_transaction_inner(&self) -> Result<()> {
        let wallet = self.wallet()?;
        let (from, form) = {
            let state = self.state.borrow();
            (state.current_account, state.form_data.clone())
        };
        let from = from.ok_or(Error::NotConnected)?;
        let to: Address = form
            .address_to
            .trim()
            .parse()
            .map_err(|e| Error::InvalidInput(format!("invalid recipient {:?}: {e}", form.address_to)))?;
        let amount = parse_amount(&form.amount)?;

        let request = TransferRequest::new(from, to, self.settings.gas_limit, amount);
        let transfer_hash = wallet.send_transaction(request).await?;
        info!("Transfer submitted: {}", transfer_hash);

        let hash = self
            .contract
            .add_to_blockchain(from, to, amount, &form.message, &form.keyword)
            .await?;
        let pending = PendingTransaction::new(self.contract.as_ref(), hash);

        self.set_loading(true);
        info!("Loading - {}", pending.hash());
        let receipt = pending.wait().await;
        self.set_loading(false);
        let receipt = receipt?;
        info!("Success - {}", receipt.hash);

        let count = self.contract.get_transaction_count().await?;
        self.state.send_modify(|s| s.transaction_count = Some(count));
        self.store_transaction_count(count)
    }

    /// Replace the transaction list with the contract's full ledger.
    pub async fn get_all_transactions(&self) -> Result<()> {
        self.wallet()?;
        let raw = self
            .contract
            .get_all_transactions()
            .await
            .inspect_err(|e| error!("Failed to fetch transactions: {}", e))?;

        let records: Vec<TransactionRecord> =
            raw.into_iter().map(TransactionRecord::from).collect();
        debug!("Fetched {} transactions", records.len());
        self.state.send_modify(|s| s.transactions = records);
        Ok(())
    }

    /// Adopt an already-authorized account without prompting.
    pub async fn check_if_wallet_is_connected(&self) -> Result<()> {
        let wallet = self.wallet()?;
        let accounts = wallet
            .accounts()
            .await
            .inspect_err(|e| error!("Failed to read wallet accounts: {}", e))?;

        match accounts.first() {
            Some(&account) => {
                info!("Wallet already authorized {}", account);
                self.set_account(Some(account));
                self.get_all_transactions().await
            }
            None => {
                info!("No accounts found");
                Ok(())
            }
        }
    }

    /// Mirror the on-chain transaction count into state and the local store.
    pub async fn check_if_transactions_exist(&self) -> Result<()> {
        let count = self
            .contract
            .get_transaction_count()
            .await
            .inspect_err(|e| error!("Failed to read transaction count: {}", e))?;

        self.state.send_modify(|s| s.transaction_count = Some(count));
        self.store_transaction_count(count)
    }

    /// React to an account change or disconnect reported by the wallet.
    ///
    /// Losing the account keeps the transaction list; the ledger is global.
    pub async fn handle_wallet_event(&self, event: WalletEvent) -> Result<()> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first().copied() {
                Some(account) => {
                    let changed = self.state.send_if_modified(|s| {
                        if s.current_account == Some(account) {
                            return false;
                        }
                        s.current_account = Some(account);
                        true
                    });
                    if changed {
                        info!("Active account changed to {}", account);
                        self.get_all_transactions().await?;
                    }
                }
                None => {
                    info!("Wallet revoked all accounts");
                    self.set_account(None);
                }
            },
            WalletEvent::Disconnected => {
                info!("Wallet disconnected");
                self.set_account(None);
            }
        }
        Ok(())
    }

    /// Run a queued command.
    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Init => self.init().await,
            Command::ConnectWallet => self.connect_wallet().await,
            Command::HandleChange { field, value } => {
                self.handle_change(field, value);
                Ok(())
            }
            Command::SendTransaction => self.send_transaction().await,
            Command::GetAllTransactions => self.get_all_transactions().await,
        }
    }

    fn wallet(&self) -> Result<&Arc<dyn WalletProvider>> {
        match &self.wallet {
            Some(wallet) => Ok(wallet),
            None => {
                self.alert(INSTALL_WALLET_ALERT);
                Err(Error::ProviderMissing)
            }
        }
    }

    fn alert(&self, message: &str) {
        warn!("{}", message);
        if self.alerts.send(message.to_string()).is_err() {
            debug!("alert receiver dropped");
        }
    }

    fn set_account(&self, account: Option<Address>) {
        self.state.send_if_modified(|s| {
            let changed = s.current_account != account;
            s.current_account = account;
            changed
        });
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|s| s.is_loading = is_loading);
    }

    fn store_transaction_count(&self, count: u64) -> Result<()> {
        self.store
            .set(&self.settings.transaction_count_key, &count.to_string())
            .inspect_err(|e| error!("Failed to store transaction count: {}", e))
    }
}

fn load_transaction_count(store: &dyn LocalStore, settings: &SessionSettings) -> Option<u64> {
    match store.get(&settings.transaction_count_key) {
        Ok(Some(value)) => match value.parse() {
            Ok(count) => Some(count),
            Err(_) => {
                warn!("Ignoring malformed cached transaction count {:?}", value);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read cached transaction count: {}", e);
            None
        }
    }
}
