//! Account change detection for wallets that cannot push events.

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

use super::wallet::{WalletEvent, WalletProvider};

/// Polls `accounts()` and reports changes as [`WalletEvent`]s.
pub struct AccountWatcher {
    wallet: Arc<dyn WalletProvider>,
    interval: Duration,
    last: Option<Vec<Address>>,
}

impl AccountWatcher {
    pub fn new(wallet: Arc<dyn WalletProvider>, interval: Duration) -> Self {
        Self {
            wallet,
            interval,
            last: None,
        }
    }

    /// Start polling in the background. The task ends when the receiver is dropped.
    pub fn spawn(self) -> (UnboundedReceiver<WalletEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(tx));
        (rx, task)
    }

    async fn run(mut self, tx: UnboundedSender<WalletEvent>) {
        let mut interval = tokio::time::interval(self.interval);
        loop {
            interval.tick().await;
            if tx.is_closed() {
                break;
            }
            if let Some(event) = self.poll().await {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("account watcher stopped");
    }

    /// Query the wallet once. The first successful poll only records a baseline.
    pub async fn poll(&mut self) -> Option<WalletEvent> {
        let accounts = match self.wallet.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Failed to poll wallet accounts: {}", e);
                return None;
            }
        };

        let previous = self.last.replace(accounts.clone());
        match previous {
            Some(previous) if previous != accounts => Some(WalletEvent::AccountsChanged(accounts)),
            _ => None,
        }
    }
}
