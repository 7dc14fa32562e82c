// src/storage/store_server.rs — Async message passing for Store

use crate::sentiment::TurnSentiment;
use crate::storage::store::{HistoryEntry, SessionRecord, SessionSummary, Store};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum StoreCommand {
    CreateSession {
        first_message: String,
        resp: oneshot::Sender<anyhow::Result<SessionRecord>>,
    },
    GetSession {
        id: String,
        resp: oneshot::Sender<anyhow::Result<Option<SessionRecord>>>,
    },
    LoadHistory {
        id: String,
        resp: oneshot::Sender<anyhow::Result<Option<Vec<HistoryEntry>>>>,
    },
    AppendExchange {
        id: String,
        user_text: String,
        sentiment: TurnSentiment,
        reply: String,
        resp: oneshot::Sender<anyhow::Result<bool>>,
    },
    RenameSession {
        id: String,
        title: String,
        resp: oneshot::Sender<anyhow::Result<bool>>,
    },
    ListSessions {
        resp: oneshot::Sender<anyhow::Result<Vec<SessionSummary>>>,
    },
}

/// A handle to the Store that uses message passing.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    pub async fn create_session(&self, first_message: String) -> anyhow::Result<SessionRecord> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::CreateSession {
                first_message,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn get_session(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::GetSession {
                id: id.to_string(),
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn load_history(&self, id: &str) -> anyhow::Result<Option<Vec<HistoryEntry>>> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::LoadHistory {
                id: id.to_string(),
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn append_exchange(
        &self,
        id: &str,
        user_text: String,
        sentiment: TurnSentiment,
        reply: String,
    ) -> anyhow::Result<bool> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::AppendExchange {
                id: id.to_string(),
                user_text,
                sentiment,
                reply,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn rename_session(&self, id: &str, title: String) -> anyhow::Result<bool> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::RenameSession {
                id: id.to_string(),
                title,
                resp: resp_tx,
            })
            .await?;
        resp_rx.await?
    }

    pub async fn list_sessions(&self) -> anyhow::Result<Vec<SessionSummary>> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::ListSessions { resp: resp_tx })
            .await?;
        resp_rx.await?
    }
}

/// Helper to spawn the store server and return a handle.
pub fn spawn_store_server(store: Store) -> (StoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = StoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::CreateSession {
                first_message,
                resp,
            } => {
                let _ = resp.send(store.create_session(&first_message));
            }
            StoreCommand::GetSession { id, resp } => {
                let _ = resp.send(store.get_session(&id));
            }
            StoreCommand::LoadHistory { id, resp } => {
                let _ = resp.send(store.load_history(&id));
            }
            StoreCommand::AppendExchange {
                id,
                user_text,
                sentiment,
                reply,
                resp,
            } => {
                let res = store.append_exchange(&id, &user_text, sentiment, &reply);
                let _ = resp.send(res);
            }
            StoreCommand::RenameSession { id, title, resp } => {
                let _ = resp.send(store.rename_session(&id, &title));
            }
            StoreCommand::ListSessions { resp } => {
                let _ = resp.send(store.list_sessions());
            }
        }
    }
    tracing::debug!("Store server stopped");
}
