//! Device server port — the accessory-protocol transport.
//!
//! The server exposes the accessory tree to controllers and reports what they
//! do through [`DeviceEvents`]: one broadcast channel per event kind.

use std::future::Future;

use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::{SetupCode, SetupPayload};

use crate::device_events::DeviceEvents;

/// A running accessory-protocol server.
pub trait DeviceServer: Send + Sync {
    /// Per-kind event channels the server publishes on.
    fn events(&self) -> &DeviceEvents;

    /// Code a controller must enter to pair.
    fn setup_code(&self) -> &SetupCode;

    /// Scannable form of the setup code.
    fn setup_payload(&self) -> SetupPayload;

    /// Whether at least one controller is currently paired.
    fn is_paired(&self) -> bool;

    /// Stop serving. Calling it again after a successful stop is a no-op.
    fn stop(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
