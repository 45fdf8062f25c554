//! # Main Entry Point
//!
//! Initializes the backend:
//! - Domain: Configuration and Types
//! - Infrastructure: Generation backend, Website builder, Stdio transport
//! - Application: Session, Dispatcher, File operation handlers
//! - Interface: Protocol loop
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use crate::application::session::Session;
use crate::domain::config::AppConfig;
use crate::infrastructure::generate::GenerateClient;
use crate::infrastructure::stdio::StdoutSink;
use crate::infrastructure::website::WebsiteClient;

#[derive(Parser, Debug)]
#[command(name = "codemate", version, about = "Editor sidebar chat backend")]
struct Args {
    /// Explicit config file (default search: data/config.yaml, then the
    /// per-user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workspace root to open immediately instead of waiting for the
    /// editor's config message.
    #[arg(long)]
    workspace: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(workspace) = &args.workspace {
        config.workspace.path = Some(workspace.to_string_lossy().to_string());
    }

    // 2. Logging Setup
    // Ensure log directory exists
    if !std::path::Path::new(&config.logging.dir).exists() {
        fs::create_dir_all(&config.logging.dir).context("Failed to create log directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new(&config.logging.dir).join(&config.logging.file);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(&config.logging.dir, &config.logging.file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

    // Stdout carries the protocol, so the log file is the only layer.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry().with(env_filter).with(file_layer).init();

    tracing::info!("Starting codemate...");

    // 3. Initialize Infrastructure
    let generator = Arc::new(GenerateClient::new(&config));
    let website = WebsiteClient::new(&config);
    let sink = StdoutSink;

    // 4. Session + Protocol Loop
    let mut session = Session::new(config, generator, website);
    let stdin = BufReader::new(tokio::io::stdin());
    interface::protocol::run(stdin, &mut session, &sink).await?;

    tracing::info!("Session ended");
    Ok(())
}
