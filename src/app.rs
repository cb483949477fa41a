use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use eth_transfers::{
    Session, SessionHandle, SessionSettings, SessionState, SessionWorker,
    config::Config,
    domain::{FormField, shorten_address},
    infra::{
        AccountWatcher, ContractClient, JsonRpcWallet, LocalStore, Store, TransactionsContract,
        WalletProvider,
    },
};

use crate::cli::{Args, Commands};

pub struct App {
    pub config: Config,
    pub session: Session,
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub alerts: UnboundedReceiver<String>,
}

impl App {
    pub fn new(args: &Args) -> Result<Self> {
        let config = Config::new(
            &args.network,
            args.rpc_url.as_deref(),
            args.wallet_url.as_deref(),
            args.contract_address,
        );
        config.validate()?;
        info!(
            "Using network {} (rpc {}, contract {})",
            config.network.name, config.network.rpc_url, config.contract.address
        );

        let store: Arc<dyn LocalStore> = Arc::new(Store::new(&config.network.name)?);
        let wallet: Option<Arc<dyn WalletProvider>> = config
            .network
            .wallet_url
            .as_deref()
            .map(|url| Arc::new(JsonRpcWallet::new(url)) as Arc<dyn WalletProvider>);
        let contract: Arc<dyn ContractClient> = Arc::new(TransactionsContract::new(
            config.contract.address,
            &config.network.rpc_url,
            config.network.wallet_url.as_deref(),
            config.polling.receipt_interval(),
        ));

        let (session, alerts) =
            Session::new(wallet.clone(), contract, store, SessionSettings::from(&config));

        Ok(Self {
            config,
            session,
            wallet,
            alerts,
        })
    }

    pub async fn run(self, command: Commands) -> Result<()> {
        let Self {
            config,
            session,
            wallet,
            mut alerts,
        } = self;

        let events = match (&command, wallet) {
            (Commands::Watch, Some(wallet)) => {
                let watcher = AccountWatcher::new(wallet, config.polling.accounts_interval());
                let (events, _watcher) = watcher.spawn();
                Some(events)
            }
            _ => None,
        };
        let (handle, worker) = SessionWorker::spawn(session, events);

        let result = execute(&config, &handle, &mut alerts, command).await;

        drop(handle);
        worker.await?;
        result
    }
}

async fn execute(
    config: &Config,
    handle: &SessionHandle,
    alerts: &mut UnboundedReceiver<String>,
    command: Commands,
) -> Result<()> {
    settle(handle.init().await, alerts)?;

    match command {
        Commands::Status => {
            print_status(config, &handle.state());
        }
        Commands::Connect => {
            settle(handle.connect_wallet().await, alerts)?;
            print_status(config, &handle.state());
        }
        Commands::Send {
            to,
            amount,
            keyword,
            message,
        } => {
            if !handle.state().is_connected() {
                settle(handle.connect_wallet().await, alerts)?;
            }
            handle.handle_change(FormField::AddressTo, to).await?;
            handle.handle_change(FormField::Amount, amount).await?;
            handle.handle_change(FormField::Keyword, keyword).await?;
            handle.handle_change(FormField::Message, message).await?;

            println!("Sending, waiting for confirmation...");
            settle(handle.send_transaction().await, alerts)?;
            print_status(config, &handle.state());
        }
        Commands::History => {
            if !handle.state().is_connected() {
                settle(handle.get_all_transactions().await, alerts)?;
            }
            print_history(&handle.state());
        }
        Commands::Watch => {
            print_status(config, &handle.state());
            let mut state_rx = handle.subscribe();
            loop {
                tokio::select! {
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = state_rx.borrow_and_update().clone();
                        print_alerts(alerts);
                        print_status(config, &state);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        debug!("Interrupted, leaving watch mode");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Print pending alerts and downgrade non-fatal errors.
fn settle(result: eth_transfers::Result<()>, alerts: &mut UnboundedReceiver<String>) -> Result<()> {
    print_alerts(alerts);
    match result {
        Ok(()) => Ok(()),
        Err(e) if !e.is_fatal() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn print_alerts(alerts: &mut UnboundedReceiver<String>) {
    while let Ok(alert) = alerts.try_recv() {
        eprintln!("warning: {alert}");
    }
}

fn print_status(config: &Config, state: &SessionState) {
    let account = state
        .current_account
        .map(|a| format!("{} ({})", shorten_address(&a.to_string()), state.connection()))
        .unwrap_or_else(|| state.connection().to_string());
    let count = state
        .transaction_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("Network:      {}", config.network.name);
    println!("Account:      {}", account);
    println!("Transactions: {}", count);
    if state.is_loading {
        println!("Status:       waiting for confirmation");
    }
}

fn print_history(state: &SessionState) {
    if state.transactions.is_empty() {
        println!("No transactions recorded");
        return;
    }
    for tx in &state.transactions {
        println!(
            "{:<24} {} -> {} {:>14.6} ETH  [{}] {}",
            tx.timestamp,
            shorten_address(&tx.address_from.to_string()),
            shorten_address(&tx.address.to_string()),
            tx.amount,
            tx.keyword,
            tx.message,
        );
    }
}
