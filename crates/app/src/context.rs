//! Explicit bridge context handed to every use-case.

use std::sync::Arc;

use sensorbridge_domain::accessory::AccessoryTree;

use crate::ports::{OperatorConsole, SensorSource};

/// Everything the use-cases share, built once by the entrypoint.
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct BridgeContext {
    pub tree: Arc<AccessoryTree>,
    pub sensors: Arc<dyn SensorSource>,
    pub console: Arc<dyn OperatorConsole>,
    /// Where the pairing records live, shown when the bridge is still paired.
    pub storage_location: String,
}

impl BridgeContext {
    pub fn new(
        tree: Arc<AccessoryTree>,
        sensors: Arc<dyn SensorSource>,
        console: Arc<dyn OperatorConsole>,
        storage_location: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            sensors,
            console,
            storage_location: storage_location.into(),
        }
    }
}

impl std::fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeContext")
            .field("tree", &self.tree)
            .field("storage_location", &self.storage_location)
            .finish_non_exhaustive()
    }
}
