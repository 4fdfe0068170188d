//! Events raised by the accessory model and the transport.
//!
//! The model itself only knows the [`ModelObserver`] seam; the transport
//! implements it and forwards each event kind on its own channel.

use serde::Serialize;

use crate::characteristic::{CharacteristicKind, Value};
use crate::id::{AccessoryId, CharacteristicKey};
use crate::pairing::PairingState;
use crate::service::ServiceKind;

/// A characteristic value was stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChange {
    pub key: CharacteristicKey,
    pub service: ServiceKind,
    pub characteristic: CharacteristicKind,
    pub old: Value,
    pub new: Value,
}

/// A controller asked an accessory to identify itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdentifyRequest {
    pub aid: AccessoryId,
}

/// A controller subscribed to or unsubscribed from a characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionChange {
    pub key: CharacteristicKey,
    pub service: ServiceKind,
    pub characteristic: CharacteristicKind,
    pub subscriber: String,
}

/// The bridge moved between pairing states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairingTransition {
    pub from: PairingState,
    pub to: PairingState,
}

/// Receives the notifications raised by an accessory tree.
///
/// Implementations are called synchronously from the writing thread, after
/// the characteristic's lock has been released. They must not block and have
/// no way to fail the originating write.
pub trait ModelObserver: Send + Sync {
    /// A value was stored (always called, even when `old == new`).
    fn value_changed(&self, change: &ValueChange);

    /// A value was stored on a characteristic that has subscribers.
    fn push_requested(&self, change: &ValueChange);

    /// `identify` was invoked on an accessory.
    fn identify_requested(&self, request: &IdentifyRequest);
}
