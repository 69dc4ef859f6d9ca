//! Decoy-domain rewriting gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                     GATEWAY                          │
//!   Client Request    │  ┌─────────┐   ┌──────────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│   routing    │──▶│   forward    │───┼──▶ Real
//!                     │  │redirects│   │prefix → real │   │ host swap,   │   │    Upstream
//!                     │  │ https   │   │ path cleanup │   │ https only   │   │
//!                     │  └─────────┘   └──────────────┘   └──────┬───────┘   │
//!                     │                                          │           │
//!   Client Response   │  ┌──────────────────────────────────┐    │           │
//!   ◀─────────────────┼──│ response: header policy + rewrite │◀──┘           │
//!                     │  └──────────────────────────────────┘                │
//!                     │                                                      │
//!                     │  config · observability · security · lifecycle       │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use decoy_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use decoy_gateway::lifecycle::startup;
use decoy_gateway::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "decoy-gateway", version, about = "Decoy-domain rewriting gateway")]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "DECOY_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability);
    tracing::info!("decoy-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    startup::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
