//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use sensorbridge_app::device_events::DeviceEvents;
use sensorbridge_domain::accessory::AccessoryTree;
use sensorbridge_domain::event::ValueChange;
use sensorbridge_domain::pairing::{SetupCode, SetupPayload};

use crate::pairing::PairingRegistry;

/// How a controller pairs with this bridge.
#[derive(Debug, Clone)]
pub struct SetupInfo {
    pub code: SetupCode,
    pub payload: SetupPayload,
}

/// Application state shared across all axum handlers.
///
/// Generic over the pairing store to avoid dynamic dispatch. `Clone` is
/// implemented manually so the store itself does not need to be `Clone`.
pub struct AppState<P> {
    pub tree: Arc<AccessoryTree>,
    pub events: DeviceEvents,
    /// Values to push to subscribed controllers.
    pub pushes: broadcast::Sender<ValueChange>,
    pub pairings: Arc<PairingRegistry<P>>,
    pub setup: Arc<SetupInfo>,
    /// Cancelled when the server stops; ends long-lived responses.
    pub shutdown: CancellationToken,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            events: self.events.clone(),
            pushes: self.pushes.clone(),
            pairings: Arc::clone(&self.pairings),
            setup: Arc::clone(&self.setup),
            shutdown: self.shutdown.clone(),
        }
    }
}
