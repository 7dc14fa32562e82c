// src/sentiment/registry.rs — Per-session conversation cache

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::aggregator::Conversation;
use super::{Emotion, SentimentLabel, Turn, TurnAnalysis};
use crate::storage::{EntryRole, HistoryEntry, StoreHandle};

pub type SessionConversation = Arc<Mutex<Conversation>>;

/// In-memory conversations keyed by session id.
///
/// A session is hydrated from persisted history the first time it is
/// touched, so context and reports survive a restart. Each session has its
/// own lock; a turn holds it from reading context through recording, so
/// turns of one session are applied in the order they are persisted.
///
/// Loaded sessions stay cached for the life of the process; nothing is
/// evicted.
#[derive(Default)]
pub struct ConversationRegistry {
    sessions: Mutex<HashMap<String, SessionConversation>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared conversation of a session, loading it from the store when
    /// not cached. `None` when the session does not exist.
    pub async fn session(
        &self,
        session_id: &str,
        store: &StoreHandle,
    ) -> anyhow::Result<Option<SessionConversation>> {
        if let Some(conversation) = self.sessions.lock().await.get(session_id) {
            return Ok(Some(Arc::clone(conversation)));
        }

        let Some(history) = store.load_history(session_id).await? else {
            return Ok(None);
        };
        let conversation = turns_from_history(&history);
        tracing::debug!(
            session_id,
            turns = conversation.len(),
            "Hydrated conversation from store"
        );

        // A concurrent load may have won; keep whichever entry landed first.
        let mut sessions = self.sessions.lock().await;
        let cached = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(conversation)));
        Ok(Some(Arc::clone(cached)))
    }

    /// Snapshot of a session's conversation.
    pub async fn get_or_load(
        &self,
        session_id: &str,
        store: &StoreHandle,
    ) -> anyhow::Result<Option<Conversation>> {
        match self.session(session_id, store).await? {
            Some(conversation) => Ok(Some(conversation.lock().await.clone())),
            None => Ok(None),
        }
    }
}

/// Pair each user entry with the model entry that follows it.
pub fn turns_from_history(history: &[HistoryEntry]) -> Conversation {
    let mut turns = Vec::with_capacity(history.len() / 2);
    let mut entries = history.iter().peekable();

    while let Some(entry) = entries.next() {
        if entry.role != EntryRole::User {
            continue;
        }
        let reply = match entries.peek() {
            Some(next) if next.role == EntryRole::Model => {
                let text = next.text.clone();
                entries.next();
                text
            }
            _ => String::new(),
        };
        let analysis = match entry.sentiment {
            Some(s) => TurnAnalysis {
                score: s.score,
                label: s.label,
                emotion: s.emotion,
                reply,
            },
            None => TurnAnalysis {
                score: 0.0,
                label: SentimentLabel::Neutral,
                emotion: Emotion::Neutral,
                reply,
            },
        };
        turns.push(Turn::new(entry.text.clone(), analysis));
    }

    Conversation::from_turns(turns)
}
