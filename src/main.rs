//! ollama-chat - an interactive terminal chat with a local Ollama model.
//!
//! Reads a line, sends it to Ollama as a standalone message, prints the
//! reply, and logs every turn to `data/logs/chat_<date>.log`.

mod config;
mod llm;
mod logging;
mod protocol;
mod session;
mod spinner;

use anyhow::{Context, Result};
use clap::Parser;
use llm::{ChatBackend, OllamaBackend};
use session::Session;
use std::io::IsTerminal;
use tokio::io::BufReader;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ollama-chat")]
#[command(author, version, about = "Chat with a local Ollama model from the terminal")]
#[command(long_about = "Chat with a local Ollama model from the terminal.\n\nType a message and press Enter; type 'exit' to quit. Every turn is logged to data/logs/.")]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _cli = Cli::parse();
    let config = config::Config::default();

    logging::ensure_directories(&config).context("Failed to create data directories")?;
    logging::configure_logging(&config).context("Failed to configure logging")?;

    let outcome = chat(&config).await;
    logging::shutdown().context("Failed to flush the log file")?;
    outcome
}

/// Connect to Ollama and run the interactive session.
async fn chat(config: &config::Config) -> Result<()> {
    let backend = OllamaBackend::new(config.model.clone(), config.host.clone())
        .context("Failed to create Ollama client")?;
    info!("Using backend: {} ({})", backend.name(), backend.model());

    // Not fatal: the server may come up while the user is typing.
    if let Err(e) = backend.health_check().await {
        warn!("Ollama health check failed: {}", e);
        eprintln!("Warning: Ollama is not reachable at {} - is it running?", config.host);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut session = Session::new(backend, stdin, std::io::stdout());
    if !std::io::stderr().is_terminal() {
        session = session.without_spinner();
    }
    session.run().await.context("Terminal I/O failed")
}
