//! The running device server.
//!
//! [`LocalDeviceServer::start`] binds the listener, wires the accessory tree
//! to the server channels and serves the router on a background task until
//! [`DeviceServer::stop`] is called.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sensorbridge_app::device_events::DeviceEvents;
use sensorbridge_app::ports::{DeviceServer, PairingStore};
use sensorbridge_domain::accessory::{AccessoryTree, Category};
use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::{PairingRecords, SetupCode, SetupId, SetupPayload};

use crate::error::ServerError;
use crate::observer::ServerObserver;
use crate::pairing::PairingRegistry;
use crate::state::{AppState, SetupInfo};

const PUSH_CAPACITY: usize = 256;

/// Where and how the server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub setup_code: SetupCode,
    pub setup_id: SetupId,
}

impl ServerConfig {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Device server answering controllers over local HTTP.
pub struct LocalDeviceServer<P> {
    events: DeviceEvents,
    setup: Arc<SetupInfo>,
    registry: Arc<PairingRegistry<P>>,
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<io::Result<()>>>>,
}

impl<P> LocalDeviceServer<P>
where
    P: PairingStore + 'static,
{
    /// Bind the listener and start serving `tree`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the address cannot be bound, or
    /// [`BridgeError::ObserverAlreadyAttached`] when `tree` is already
    /// served by another server.
    pub async fn start(
        config: ServerConfig,
        tree: Arc<AccessoryTree>,
        store: P,
        records: PairingRecords,
    ) -> Result<Self, BridgeError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        let events = DeviceEvents::default();
        let (pushes, _) = broadcast::channel(PUSH_CAPACITY);
        tree.attach_observer(Arc::new(ServerObserver::new(
            events.clone(),
            pushes.clone(),
        )))?;

        let payload = SetupPayload::new(&config.setup_code, &config.setup_id, Category::Bridge);
        let setup = Arc::new(SetupInfo {
            code: config.setup_code,
            payload,
        });
        let registry = Arc::new(PairingRegistry::new(store, records, events.clone()));

        let shutdown = CancellationToken::new();
        let router = crate::router::build(AppState {
            tree,
            events: events.clone(),
            pushes,
            pairings: Arc::clone(&registry),
            setup: Arc::clone(&setup),
            shutdown: shutdown.clone(),
        });

        let signal = shutdown.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
        });

        tracing::info!(
            address = %local_addr,
            paired = registry.is_paired(),
            pairing_file = %registry.location(),
            "device server listening"
        );

        Ok(Self {
            events,
            setup,
            registry,
            local_addr,
            shutdown,
            task: Mutex::new(Some(task)),
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl<P> DeviceServer for LocalDeviceServer<P>
where
    P: PairingStore + 'static,
{
    fn events(&self) -> &DeviceEvents {
        &self.events
    }

    fn setup_code(&self) -> &SetupCode {
        &self.setup.code
    }

    fn setup_payload(&self) -> SetupPayload {
        self.setup.payload.clone()
    }

    fn is_paired(&self) -> bool {
        self.registry.is_paired()
    }

    async fn stop(&self) -> Result<(), BridgeError> {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(task) = task else {
            tracing::debug!(address = %self.local_addr, "device server already stopped");
            return Ok(());
        };

        self.shutdown.cancel();
        match task.await {
            Ok(Ok(())) => {
                tracing::info!(address = %self.local_addr, "device server stopped");
                Ok(())
            }
            Ok(Err(err)) => Err(ServerError::Serve(self.local_addr, err).into()),
            Err(err) => Err(ServerError::Join(self.local_addr, err).into()),
        }
    }
}
