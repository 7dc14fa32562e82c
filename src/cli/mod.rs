// src/cli/mod.rs — CLI definition (clap derive)

pub mod export;
pub mod serve;
pub mod sessions;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sentichat", about = "Sentiment-aware chat server", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve {
        /// Bind address (overrides [server].host)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List stored chat sessions
    Sessions,
    /// Export a session report
    Export {
        /// Session ID
        session_id: String,
        /// Output format: json, txt
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}
