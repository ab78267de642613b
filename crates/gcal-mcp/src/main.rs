//! `gcal-mcp` — Google Calendar MCP server over stdio.
//!
//! ## Usage
//!
//! ```sh
//! # Serve MCP over stdin/stdout, reading settings from the environment / .env
//! GOOGLE_CALENDAR_CREDENTIALS_JSON=./credentials.json gcal-mcp
//!
//! # Load a specific env file
//! gcal-mcp --env-file ./prod.env
//!
//! # Validate configuration and credentials, then exit
//! gcal-mcp --check-config
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gcal_mcp::{CalendarServer, CalendarService, Config, GoogleCalendar, ToolManager};
use rmcp::{transport::stdio, ServiceExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gcal-mcp",
    version,
    about = "Google Calendar MCP server (stdio transport)"
)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Validate configuration and credentials, print a summary, and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file: {}", path.display()))?;
        }
        // A missing ./.env is fine.
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = Config::from_env().context("Failed to load configuration")?;

    if cli.check_config {
        return check_config(&config);
    }

    // stdout carries the MCP protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(config = %config, "starting {} v{}", config.server_name, config.server_version);

    let service: Option<Arc<dyn CalendarService>> = match GoogleCalendar::new(&config) {
        Ok(calendar) => Some(Arc::new(calendar)),
        Err(err) => {
            warn!(error = %err, "calendar service unavailable; calendar tools will return errors");
            None
        }
    };

    let server = CalendarServer::new(
        ToolManager::new(service),
        config.server_name.clone(),
        config.server_version.clone(),
    );
    let running = server
        .serve(stdio())
        .await
        .context("Failed to start MCP server")?;
    running.waiting().await.context("MCP server stopped unexpectedly")?;

    info!("shutting down");
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    println!("Configuration OK: {}", config);
    println!("Server: {} v{}", config.server_name, config.server_version);
    GoogleCalendar::new(config).context("Calendar client could not be initialised")?;
    println!("Credentials OK");
    Ok(())
}
