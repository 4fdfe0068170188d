//! Pairing store port — persisted bridge identity and controller pairings.

use std::future::Future;

use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::PairingRecords;

/// Loads and saves the [`PairingRecords`] between runs.
pub trait PairingStore: Send + Sync {
    /// Load the persisted records, or fresh defaults when nothing is stored.
    fn load(&self) -> impl Future<Output = Result<PairingRecords, BridgeError>> + Send;

    /// Replace the persisted records.
    fn save(&self, records: &PairingRecords)
    -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Wipe everything persisted so the bridge starts unpaired.
    fn reset(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Human readable location of the storage, shown to the operator.
    fn location(&self) -> String;
}
