//! Serialized command queue in front of a [`Session`].

use tokio::{
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        oneshot, watch,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::{Command, Session, SessionState};
use crate::{
    domain::FormField,
    error::{Error, Result},
    infra::WalletEvent,
};

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<()>>,
}

/// Owns a session and runs one command at a time.
pub struct SessionWorker {
    session: Session,
    requests: UnboundedReceiver<Request>,
    events: Option<UnboundedReceiver<WalletEvent>>,
}

impl SessionWorker {
    /// Spawn the worker. Wallet events, when given, are applied between commands.
    pub fn spawn(
        session: Session,
        events: Option<UnboundedReceiver<WalletEvent>>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            requests: requests_tx,
            state: session.subscribe(),
        };
        let worker = Self {
            session,
            requests,
            events,
        };
        (handle, tokio::spawn(worker.run()))
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(Request { command, reply }) = request else {
                        break;
                    };
                    debug!("Executing {}", command);
                    let result = self.session.execute(command).await;
                    if reply.send(result).is_err() {
                        debug!("command caller went away");
                    }
                }
                event = next_event(&mut self.events) => match event {
                    Some(event) => {
                        if let Err(e) = self.session.handle_wallet_event(event).await {
                            warn!("Failed to apply wallet event: {}", e);
                        }
                    }
                    None => {
                        debug!("wallet event stream closed");
                        self.events = None;
                    }
                },
            }
        }
        info!("Session worker stopped");
    }
}

async fn next_event(events: &mut Option<UnboundedReceiver<WalletEvent>>) -> Option<WalletEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Cloneable front end of a [`SessionWorker`].
#[derive(Clone)]
pub struct SessionHandle {
    requests: UnboundedSender<Request>,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub async fn init(&self) -> Result<()> {
        self.dispatch(Command::Init).await
    }

    pub async fn connect_wallet(&self) -> Result<()> {
        self.dispatch(Command::ConnectWallet).await
    }

    pub async fn handle_change(&self, field: FormField, value: impl Into<String>) -> Result<()> {
        self.dispatch(Command::HandleChange {
            field,
            value: value.into(),
        })
        .await
    }

    pub async fn send_transaction(&self) -> Result<()> {
        self.dispatch(Command::SendTransaction).await
    }

    pub async fn get_all_transactions(&self) -> Result<()> {
        self.dispatch(Command::GetAllTransactions).await
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Queue a command and wait for its result.
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .map_err(|_| Error::Unknown("session worker stopped".to_string()))?;
        rx.await
            .map_err(|_| Error::Unknown("session worker dropped the request".to_string()))?
    }
}
