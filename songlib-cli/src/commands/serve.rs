//! HTTP server command
//!
//! Connects to Postgres, prepares the schema and serves the song API.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use songlib_server::http::{bootstrap, run_server, ServerConfig};
use songlib_server::Config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides http.host/http.port from config)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: Config) -> Result<()> {
    config.validate().context("Configuration is invalid")?;

    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    tracing::info!(
        app = %config.app.name,
        version = %config.app.version,
        "Starting server on {}",
        bind_addr
    );

    let state = bootstrap(&config)
        .await
        .context("Failed to initialize server")?;

    let server_config = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.http.cors_permissive,
    };

    // Blocks until shutdown
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
