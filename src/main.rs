// src/main.rs — SentiChat entry point

use clap::Parser;

use sentichat::cli::{Cli, Commands};
use sentichat::infra::config::Config;
use sentichat::infra::logger;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Falls back to defaults if no config.toml
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        None => sentichat::cli::serve::run_serve(config, None, None).await,
        Some(Commands::Serve { host, port }) => {
            sentichat::cli::serve::run_serve(config, host, port).await
        }
        Some(Commands::Sessions) => sentichat::cli::sessions::run_sessions(&config).await,
        Some(Commands::Export {
            session_id,
            format,
            output,
        }) => {
            sentichat::cli::export::run_export(&config, &session_id, &format, output.as_deref())
                .await
        }
    }
}
