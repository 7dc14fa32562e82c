// src/storage/store.rs — SQLite operations for chat sessions

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sentiment::TurnSentiment;
use crate::util::truncate_chars;

/// Characters of the first message kept in a session title.
const TITLE_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    User,
    Model,
}

/// One persisted history entry. User entries carry their sentiment; model
/// entries carry `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: EntryRole,
    pub text: String,
    pub sentiment: Option<TurnSentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

/// Title shown in the session list for a conversation opened by `first_message`.
pub fn derive_title(first_message: &str) -> String {
    format!("{}...", truncate_chars(first_message.trim(), TITLE_CHARS))
}

/// Low-level SQLite operations over the sessions table.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create an empty session titled after its first message.
    pub fn create_session(&self, first_message: &str) -> anyhow::Result<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            title: derive_title(first_message),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };
        self.conn.execute(
            "INSERT INTO sessions (id, title, created_at, history) VALUES (?1, ?2, ?3, '[]')",
            params![record.id, record.title, record.created_at],
        )?;
        Ok(record)
    }

    pub fn get_session(&self, id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, title, created_at FROM sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok(SessionRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Ordered history for a session, or `None` if the id is unknown.
    pub fn load_history(&self, id: &str) -> anyhow::Result<Option<Vec<HistoryEntry>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT history FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Append a user entry and the model's reply. Returns `false` when the
    /// session does not exist.
    pub fn append_exchange(
        &self,
        id: &str,
        user_text: &str,
        sentiment: TurnSentiment,
        reply: &str,
    ) -> anyhow::Result<bool> {
        let tx = self.conn.unchecked_transaction()?;

        let raw: Option<String> = tx
            .query_row(
                "SELECT history FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(raw) = raw else {
            return Ok(false);
        };

        let mut history: Vec<HistoryEntry> = serde_json::from_str(&raw)?;
        history.push(HistoryEntry {
            role: EntryRole::User,
            text: user_text.to_string(),
            sentiment: Some(sentiment),
        });
        history.push(HistoryEntry {
            role: EntryRole::Model,
            text: reply.to_string(),
            sentiment: None,
        });

        tx.execute(
            "UPDATE sessions SET history = ?1 WHERE id = ?2",
            params![serde_json::to_string(&history)?, id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Returns `false` when the session does not exist.
    pub fn rename_session(&self, id: &str, title: &str) -> anyhow::Result<bool> {
        let count = self.conn.execute(
            "UPDATE sessions SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
        Ok(count > 0)
    }

    /// All sessions, most recent first.
    pub fn list_sessions(&self) -> anyhow::Result<Vec<SessionSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM sessions ORDER BY created_at DESC, rowid DESC")?;

        let rows = stmt.query_map([], |row| {
            Ok(SessionSummary {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_short() {
        assert_eq!(derive_title("Hello"), "Hello...");
    }

    #[test]
    fn test_derive_title_truncates() {
        let title = derive_title("I had a really long day at work and want to talk");
        assert_eq!(title, "I had a really long day at wor...");
    }

    #[test]
    fn test_derive_title_multibyte() {
        let title = derive_title(&"é".repeat(40));
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn test_history_entry_wire_shape() {
        let entry = HistoryEntry {
            role: EntryRole::Model,
            text: "hi".into(),
            sentiment: None,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({ "role": "model", "text": "hi", "sentiment": null })
        );
    }
}
