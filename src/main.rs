//! Tenant Notes client
//!
//! Run with: cargo run -- [--config <path>] [--api-url <url>] [--start <path>]
//!
//! # Configuration
//!
//! Settings come from the config file (see `tenant-notes config`) and these
//! environment variables:
//! - `TENANT_NOTES_API_URL`: Backend base URL (default: http://localhost:8000)
//! - `TENANT_NOTES_API_TIMEOUT`: Request timeout in seconds (default: 10)
//! - `TENANT_NOTES_STORAGE_PATH`: File holding the session (default: data dir)
//! - `TENANT_NOTES_LOG_LEVEL`: Log level (default: info)
//! - `TENANT_NOTES_LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Overrides the log filter entirely

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tenant_notes::config::{generate_default_config, Config, LoggingConfig};
use tenant_notes::{shell, App};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tenant-notes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for the multi-tenant notes service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to open first
    #[arg(long, default_value = "/")]
    start: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tenant_notes={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { output }) = cli.command {
        let config = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    init_tracing(&config.logging);
    tracing::info!("Tenant Notes v{}", env!("CARGO_PKG_VERSION"));

    let app = App::from_config(&config).context("starting client")?;
    let logger = app.spawn_event_logger();

    app.start(&cli.start).await;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    shell::run(&app, stdin, &mut stdout).await?;

    drop(app);
    logger.abort();
    tracing::info!("Goodbye");
    Ok(())
}
