// src/cli/export.rs — Session report export
//
// Writes the same JSON/TXT report the download route serves. The executive
// summary needs the model; without an API key it is reported as failed.

use crate::infra::config::Config;
use crate::infra::errors::SentiChatError;
use crate::provider::resolver;
use crate::report::{self, ReportFormat};
use crate::sentiment::processor::TurnProcessor;
use crate::sentiment::registry::ConversationRegistry;
use crate::storage::{spawn_store_server, Database};

pub async fn run_export(
    config: &Config,
    session_id: &str,
    format: &str,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let format: ReportFormat = format.parse().map_err(anyhow::Error::msg)?;

    let db_path = config.db_path()?;
    if !db_path.exists() {
        anyhow::bail!("No database found at {}", db_path.display());
    }
    let db = Database::open(&db_path)?;
    let (store, _store_task) = spawn_store_server(db.store);

    let processor = match resolver::provider_from_config(config) {
        Ok(provider) => Some(TurnProcessor::new(provider, config)),
        Err(e) => {
            tracing::warn!("Skipping executive summary: {}", e);
            None
        }
    };

    let registry = ConversationRegistry::new();
    let Some(report) =
        report::generate_report(&store, &registry, processor.as_ref(), session_id).await?
    else {
        return Err(SentiChatError::SessionNotFound {
            id: session_id.to_string(),
        }
        .into());
    };

    let rendered = report.render(format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("Exported {} to {}", session_id, path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
