//! Inbound listener daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ watcher ─┐                 ┌──▶ HTTP      ─┐
//!   SIGHUP ─────────────────┼─▶ controller ──▶ │──▶ SOCKS TCP ─┼─▶ protocol
//!   PATCH /configs ─────────┘    registry      │──▶ SOCKS UDP ─┤   handlers
//!                                              └──▶ redirect  ─┘
//!   GET /configs, /status ◀──── ports / bind_address
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use inbound_listeners::admin::{setup_admin_router, AdminState};
use inbound_listeners::config::{load_config, ConfigWatcher, LimitsConfig, ProxyConfig};
use inbound_listeners::inbound::InboundController;
use inbound_listeners::lifecycle::{apply_reload, startup, Shutdown, Signal, Signals};
use inbound_listeners::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "inbound-listeners")]
#[command(about = "Keeps local proxy front-ends bound to their configured addresses", long_about = None)]
struct Args {
    /// Configuration file (TOML). Defaults apply when it does not exist.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Do not watch the configuration file for changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_exists = args.config.exists();
    let config = if config_exists {
        load_config(&args.config)?
    } else {
        ProxyConfig::default()
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "inbound-listeners starting");
    if !config_exists {
        tracing::warn!(path = ?args.config, "Config file not found, using defaults");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = startup::start(&config, startup::default_factories(&config.limits)).await;
    let controller = Arc::new(InboundController::new(
        Arc::clone(&registry),
        config.inbound.clone(),
    ));
    let shutdown = Shutdown::new();

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");

        let app = setup_admin_router(AdminState {
            controller: Arc::clone(&controller),
            api_key: config.admin.api_key.as_str().into(),
        });
        let stopped = shutdown.signalled();
        Some(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(stopped)
                .await
        }))
    } else {
        None
    };

    let (watcher, mut updates) = ConfigWatcher::new(&args.config);
    let _watcher = if config_exists && !args.no_watch {
        match watcher.run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, reload with SIGHUP");
                None
            }
        }
    } else {
        None
    };

    let limits = config.limits.clone();
    let mut signals = Signals::install()?;
    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                let _ = apply_reload(&controller, &limits, new_config).await;
            }
            signal = signals.recv() => match signal? {
                Signal::Shutdown => break,
                Signal::Reload => reload_from_disk(&controller, &limits, &args.config).await,
            },
        }
    }

    tracing::info!("Shutdown signal received");
    shutdown.trigger();
    if let Some(task) = admin_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API stopped with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task failed"),
        }
    }
    registry.close_all().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn reload_from_disk(controller: &InboundController, limits: &LimitsConfig, path: &Path) {
    match load_config(path) {
        Ok(config) => {
            let _ = apply_reload(controller, limits, config).await;
        }
        Err(e) => tracing::error!(error = %e, "Failed to reload config, keeping current configuration"),
    }
}
