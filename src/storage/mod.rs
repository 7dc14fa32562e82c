// src/storage/mod.rs — Session database

pub mod schema;
pub mod store;
pub mod store_server;

use rusqlite::Connection;
use std::path::Path;

pub use store::{EntryRole, HistoryEntry, SessionRecord, SessionSummary, Store};
pub use store_server::{spawn_store_server, StoreHandle};

/// Owns the SQLite connection until it is handed to the store actor.
pub struct Database {
    pub store: Store,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        schema::run_migrations(&conn)?;
        tracing::debug!("Opened session database at {}", path.display());

        Ok(Self {
            store: Store::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self {
            store: Store::new(conn),
        })
    }
}
