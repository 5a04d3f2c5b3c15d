//! # dpdmark: DPD Journals marketing backend
//!
//! Tracking pixel, scheduled social/email campaigns, blog publishing and
//! SEO feeds behind one HTTP server.
//!
//! Usage:
//!   dpdmark                       # Start server + scheduler (port from config, default 8000)
//!   dpdmark --port 9000           # Custom port
//!   dpdmark --db ./dev.sqlite3    # Custom database file
//!   dpdmark sweep                 # Dispatch everything due once and exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dpdmark_core::config::MarketingConfig;
use dpdmark_db::MarketingDb;
use dpdmark_gateway::AppContext;
use dpdmark_scheduler::Dispatcher;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dpdmark",
    version,
    about = "📈 dpdmark, the marketing site backend for DPD Journals"
)]
struct Cli {
    /// Config file (default: $DPDMARK_CONFIG or ~/.dpdmark/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database path, overrides config and DPD_DB
    #[arg(long)]
    db: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one dispatch sweep, print the report and exit
    Sweep,
}

fn load_config(cli: &Cli) -> Result<MarketingConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = MarketingConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => MarketingConfig::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "dpdmark=debug,dpdmark_gateway=debug,dpdmark_scheduler=debug,dpdmark_content=debug,tower_http=debug"
    } else {
        "dpdmark=info,dpdmark_gateway=info,dpdmark_scheduler=info,dpdmark_content=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = load_config(&cli)?;

    // The store is the one fatal dependency
    let db_path = config.database.resolved_path();
    let db = Arc::new(
        MarketingDb::open(&db_path)
            .with_context(|| format!("opening database {}", db_path.display()))?,
    );
    tracing::info!("💾 Database ready: {}", db_path.display());

    let dispatcher = Arc::new(Dispatcher::new(db.clone(), config.scheduler.preview_chars));

    if let Some(Command::Sweep) = cli.command {
        let report = tokio::task::spawn_blocking(move || dispatcher.sweep_now()).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    AppContext::start(config, db, dispatcher).run().await
}
