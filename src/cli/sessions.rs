// src/cli/sessions.rs — List stored sessions

use crate::infra::config::Config;
use crate::storage::Database;

pub async fn run_sessions(config: &Config) -> anyhow::Result<()> {
    let db_path = config.db_path()?;
    if !db_path.exists() {
        println!("No sessions yet.");
        return Ok(());
    }

    let db = Database::open(&db_path)?;
    let sessions = db.store.list_sessions()?;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for s in sessions {
        println!("{}  {}", s.id, s.title);
    }
    Ok(())
}
