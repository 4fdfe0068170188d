//! Lifecycle controller — reacts to what controllers do with the bridge.
//!
//! Identify, value and subscription events are observability only. A pairing
//! transition to `NotPaired` renders fresh pairing instructions. The
//! controller also owns the one and only call to [`DeviceServer::stop`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::event::{
    IdentifyRequest, PairingTransition, SubscriptionChange, ValueChange,
};
use sensorbridge_domain::id::AccessoryId;
use sensorbridge_domain::pairing::{PairingInstructions, PairingState};

use crate::context::BridgeContext;
use crate::ports::DeviceServer;

/// Routes device events to logs and the operator console.
pub struct LifecycleController<S> {
    context: BridgeContext,
    server: Arc<S>,
    stopped: AtomicBool,
}

impl<S: DeviceServer> LifecycleController<S> {
    pub fn new(context: BridgeContext, server: Arc<S>) -> Self {
        Self {
            context,
            server,
            stopped: AtomicBool::new(false),
        }
    }

    fn accessory_name(&self, aid: AccessoryId) -> &str {
        self.context
            .tree
            .accessory(aid)
            .map_or("unknown", |accessory| accessory.name())
    }

    pub fn on_identify(&self, request: &IdentifyRequest) {
        tracing::info!(aid = %request.aid, accessory = self.accessory_name(request.aid), "identify requested");
    }

    pub fn on_characteristic_changed(&self, change: &ValueChange) {
        tracing::debug!(
            accessory = self.accessory_name(change.key.aid),
            service = %change.service,
            characteristic = %change.characteristic,
            old = %change.old,
            new = %change.new,
            "characteristic changed"
        );
    }

    pub fn on_subscribed(&self, change: &SubscriptionChange) {
        tracing::info!(
            accessory = self.accessory_name(change.key.aid),
            service = %change.service,
            characteristic = %change.characteristic,
            subscriber = %change.subscriber,
            "controller subscribed"
        );
    }

    pub fn on_unsubscribed(&self, change: &SubscriptionChange) {
        tracing::info!(
            accessory = self.accessory_name(change.key.aid),
            service = %change.service,
            characteristic = %change.characteristic,
            subscriber = %change.subscriber,
            "controller unsubscribed"
        );
    }

    /// Log the transition and, when the bridge became unpaired, show how to
    /// pair it again.
    pub fn on_pairing_state_changed(&self, transition: &PairingTransition) {
        tracing::info!(from = %transition.from, to = %transition.to, "pairing state changed");
        if transition.to == PairingState::NotPaired {
            self.show_pairing_instructions();
        }
    }

    /// Instructions for the current pairing status, as reported by the server
    /// right now.
    #[must_use]
    pub fn pairing_instructions(&self) -> PairingInstructions {
        if self.server.is_paired() {
            PairingInstructions::Paired {
                storage: self.context.storage_location.clone(),
            }
        } else {
            PairingInstructions::Unpaired {
                setup_code: self.server.setup_code().clone(),
                payload: self.server.setup_payload(),
            }
        }
    }

    /// Render the pairing instructions on the operator console.
    ///
    /// Console failures are logged, never propagated.
    pub fn show_pairing_instructions(&self) {
        let instructions = self.pairing_instructions();
        if let Err(err) = self.context.console.show(&instructions) {
            tracing::warn!(error = %err, "unable to show pairing instructions");
        }
    }

    /// Stop the device server. Only the first call reaches the server.
    ///
    /// # Errors
    ///
    /// Returns the server's stop error on the first call; later calls always
    /// succeed.
    pub async fn shutdown(&self) -> Result<(), BridgeError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!("device server already stopped");
            return Ok(());
        }
        tracing::info!("stopping device server");
        self.server.stop().await.inspect_err(|err| {
            tracing::error!(error = %err, "unable to stop device server");
        })
    }
}
