// src/cli/serve.rs — Web server command

use crate::api::{self, AppState};
use crate::infra::config::Config;
use crate::provider::resolver;
use crate::sentiment::processor::TurnProcessor;
use crate::storage::{spawn_store_server, Database};

/// Open the database, resolve the model provider and serve HTTP.
///
/// A missing API key is fatal here, before anything binds.
pub async fn run_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let provider = resolver::provider_from_config(&config)?;
    let processor = TurnProcessor::new(provider, &config);

    let db_path = config.db_path()?;
    let db = Database::open(&db_path)?;
    let (store, _store_task) = spawn_store_server(db.store);

    tracing::info!(
        model = processor.model(),
        db = %db_path.display(),
        max_attempts = config.retry.max_attempts,
        "Starting SentiChat"
    );
    api::start_server(&config.server, AppState::new(store, processor)).await
}
