//! songlib CLI - song catalogue server and configuration tools
//!
//! - `serve`: run the HTTP API
//! - `config show` / `config validate`: inspect the resolved configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use songlib_server::Config;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "songlib",
    author,
    version,
    about = "Song library server with lyrics split into couplets"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: $CONFIG_PATH or config/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Inspect configuration (show, validate)
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
        default_level: config
            .as_ref()
            .map(|c| c.log.level.clone())
            .unwrap_or_else(|_| "info".to_string()),
    };
    tracing_setup::init(&tracing_config).ok();

    let config = config.context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Config(args) => commands::run_config(args, &config),
    };

    tracing_setup::shutdown_otel();
    result
}
