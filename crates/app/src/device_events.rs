//! Per-kind device event channels backed by tokio broadcast channels.

use tokio::sync::broadcast;

use sensorbridge_domain::event::{
    IdentifyRequest, PairingTransition, SubscriptionChange, ValueChange,
};

/// One broadcast channel per kind of event a device server reports.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). Subscribers only receive events published
/// *after* they subscribed.
#[derive(Debug, Clone)]
pub struct DeviceEvents {
    identify: broadcast::Sender<IdentifyRequest>,
    changes: broadcast::Sender<ValueChange>,
    subscribed: broadcast::Sender<SubscriptionChange>,
    unsubscribed: broadcast::Sender<SubscriptionChange>,
    pairing: broadcast::Sender<PairingTransition>,
}

impl DeviceEvents {
    /// Create the channels, each with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            identify: broadcast::channel(capacity).0,
            changes: broadcast::channel(capacity).0,
            subscribed: broadcast::channel(capacity).0,
            unsubscribed: broadcast::channel(capacity).0,
            pairing: broadcast::channel(capacity).0,
        }
    }

    #[must_use]
    pub fn subscribe_identify(&self) -> broadcast::Receiver<IdentifyRequest> {
        self.identify.subscribe()
    }

    #[must_use]
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ValueChange> {
        self.changes.subscribe()
    }

    #[must_use]
    pub fn subscribe_subscribed(&self) -> broadcast::Receiver<SubscriptionChange> {
        self.subscribed.subscribe()
    }

    #[must_use]
    pub fn subscribe_unsubscribed(&self) -> broadcast::Receiver<SubscriptionChange> {
        self.unsubscribed.subscribe()
    }

    #[must_use]
    pub fn subscribe_pairing(&self) -> broadcast::Receiver<PairingTransition> {
        self.pairing.subscribe()
    }

    // send fails only when nobody is listening; the event is then dropped.

    pub fn publish_identify(&self, request: IdentifyRequest) {
        let _ = self.identify.send(request);
    }

    pub fn publish_change(&self, change: ValueChange) {
        let _ = self.changes.send(change);
    }

    pub fn publish_subscribed(&self, change: SubscriptionChange) {
        let _ = self.subscribed.send(change);
    }

    pub fn publish_unsubscribed(&self, change: SubscriptionChange) {
        let _ = self.unsubscribed.send(change);
    }

    pub fn publish_pairing(&self, transition: PairingTransition) {
        let _ = self.pairing.send(transition);
    }
}

impl Default for DeviceEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
