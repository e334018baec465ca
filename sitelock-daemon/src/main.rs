mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sitelock_core::{LockEngine, SiteLocker};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::DaemonConfig;
use crate::server::LockServer;

#[derive(Parser)]
#[command(name = "sitelock-daemon", version, about = "Site locker coordinator daemon")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the store path from the configuration
    #[arg(long)]
    store: Option<PathBuf>,

    /// Override the listen address from the configuration
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    if let Some(parent) = config.store_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // A store that does not exist yet means a fresh install; an existing
    // one means a restart.
    let fresh_install = !config.store_path.exists();
    let locker = SiteLocker::open(&config.store_path)?;
    let engine = LockEngine::new(locker);
    if fresh_install {
        engine.on_installed()?;
    } else {
        engine.on_startup()?;
    }

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        addr = %config.listen_addr,
        store = %config.store_path.display(),
        "daemon listening"
    );

    let server = Arc::new(LockServer::new(engine));
    let server_handle = tokio::spawn(server.run(listener));

    signal::ctrl_c().await?;
    info!("received shutdown signal");
    server_handle.abort();

    Ok(())
}
