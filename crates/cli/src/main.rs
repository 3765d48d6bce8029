use std::path::PathBuf;
use std::sync::Arc;

use adwizard_web::config::{load_config, load_config_from_path, validate_config};
use adwizard_web::{AdWizardHttpServer, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

/// Serve the Ad Wizard field layout control panel.
#[derive(Debug, Parser)]
#[command(name = "adwizard", version, about)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Socket address to bind, overriding the configuration.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
        validate_config(&config)?;
    }

    if config.auth_token().is_none() {
        warn!("no authToken configured; every control panel request will be rejected");
    }

    let state = AppState::open(&config).context("open field layout stores")?;
    let server = AdWizardHttpServer::new(config.bind_socket_address()?, Arc::new(state))
        .start()
        .await?;
    info!(address = %server.bound_address(), data_dir = %config.data_dir().display(), "control panel listening");

    tokio::signal::ctrl_c().await.context("wait for shutdown signal")?;
    info!("shutting down");
    server.stop().await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
