//! # sensorbridged — sensor bridge daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Parse configuration (CLI flags, env vars, config file)
//! - Initialise logging
//! - Load (or wipe, with `--recreate`) the pairing file
//! - Build the accessory tree from the enumerated sensors
//! - Start the device server and the bridge runtime
//! - Handle graceful shutdown (SIGTERM/SIGINT) and bounded `--test` runs
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod config;
mod console;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sensorbridge_adapter_http_axum::{LocalDeviceServer, ServerConfig};
use sensorbridge_adapter_storage_file::JsonPairingStore;
use sensorbridge_adapter_virtual::VirtualSensorSource;
use sensorbridge_app::context::BridgeContext;
use sensorbridge_app::ports::{PairingStore, SensorSource};
use sensorbridge_app::runtime::BridgeRuntime;
use sensorbridge_app::services::lifecycle::LifecycleController;
use sensorbridge_app::services::sync_scheduler::SyncScheduler;
use sensorbridge_domain::accessory::{AccessoryInfo, AccessoryTree};

use crate::cli::Flags;
use crate::config::Config;
use crate::console::TextConsole;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flags = Flags::parse(std::env::args().skip(1))?;
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Pairing file
    let store = JsonPairingStore::new(&config.storage.path);
    if flags.recreate {
        store.reset().await?;
    }
    let records = store.load().await?;
    store.save(&records).await?;
    tracing::info!(
        path = %store.location(),
        device_id = %records.device_id,
        controllers = records.controllers.len(),
        "pairing file loaded"
    );

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        setup_code: config.setup_code()?,
        setup_id: config.setup_id()?,
    };
    let sync_config = config.sync_config();

    // Accessory tree
    let sensors = Arc::new(VirtualSensorSource::new(config.sensors));
    let bridge_info = AccessoryInfo::builder()
        .name(&config.bridge.name)
        .serial_number(&config.bridge.serial_number)
        .build()?;
    let tree = Arc::new(AccessoryTree::build(
        bridge_info,
        &sensors.grouped_descriptors(),
    ));

    // Device server
    let server = Arc::new(
        LocalDeviceServer::start(
            server_config,
            Arc::clone(&tree),
            store.clone(),
            records,
        )
        .await?,
    );

    // Runtime
    let context = BridgeContext::new(
        tree,
        sensors,
        Arc::new(TextConsole::stdout()),
        store.location(),
    );
    let scheduler = SyncScheduler::new(context.clone(), sync_config);
    let controller = Arc::new(LifecycleController::new(context, Arc::clone(&server)));

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let mut runtime = BridgeRuntime::new(scheduler, controller, server, cancel);
    if let Some(duration) = flags.run_for {
        runtime = runtime.with_run_duration(duration);
    }
    let summary = runtime.run().await?;

    tracing::info!(
        reason = %summary.reason,
        ticks = summary.ticks,
        events = summary.events,
        "sensorbridged stopped"
    );
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
    tracing::info!("shutting down");
    token.cancel();
}
