//! Controller pairings held by the running server.
//!
//! The registry keeps the persisted [`PairingRecords`] in memory, writes
//! every change through to the [`PairingStore`] and publishes a
//! [`PairingTransition`] whenever the bridge moves between paired and
//! unpaired.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use sensorbridge_app::device_events::DeviceEvents;
use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::error::{BridgeError, NotFoundError};
use sensorbridge_domain::event::PairingTransition;
use sensorbridge_domain::pairing::{ControllerPairing, PairingRecords, PairingState};
use sensorbridge_domain::time::now;

/// In-memory view of the pairings, written through to the store.
pub struct PairingRegistry<P> {
    store: P,
    records: Mutex<PairingRecords>,
    paired: AtomicBool,
    events: DeviceEvents,
}

impl<P: PairingStore> PairingRegistry<P> {
    pub fn new(store: P, records: PairingRecords, events: DeviceEvents) -> Self {
        Self {
            paired: AtomicBool::new(records.is_paired()),
            store,
            records: Mutex::new(records),
            events,
        }
    }

    /// Pairing status as of the last change.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Snapshot of the current records.
    pub async fn records(&self) -> PairingRecords {
        self.records.lock().await.clone()
    }

    /// Record a pairing for `controller`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the records cannot be persisted; the
    /// in-memory state is left unchanged in that case.
    pub async fn add(
        &self,
        controller: &str,
        public_key: String,
        admin: bool,
    ) -> Result<ControllerPairing, BridgeError> {
        let mut records = self.records.lock().await;
        let pairing = ControllerPairing {
            public_key,
            admin,
            paired_at: now(),
        };
        let mut next = records.clone();
        next.controllers.insert(controller.to_string(), pairing.clone());
        self.commit(&mut records, next).await?;
        tracing::info!(controller, admin, "controller paired");
        Ok(pairing)
    }

    /// Remove the pairing of `controller`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when the controller is not paired,
    /// or a storage error when the records cannot be persisted.
    pub async fn remove(&self, controller: &str) -> Result<(), BridgeError> {
        let mut records = self.records.lock().await;
        if !records.controllers.contains_key(controller) {
            return Err(NotFoundError {
                entity: "Pairing",
                id: controller.to_string(),
            }
            .into());
        }
        let mut next = records.clone();
        next.controllers.remove(controller);
        self.commit(&mut records, next).await?;
        tracing::info!(controller, "controller unpaired");
        Ok(())
    }

    async fn commit(
        &self,
        current: &mut PairingRecords,
        next: PairingRecords,
    ) -> Result<(), BridgeError> {
        self.store.save(&next).await?;
        let from = current.state();
        *current = next;
        let to = current.state();
        self.paired.store(to == PairingState::Paired, Ordering::SeqCst);
        if from != to {
            self.events.publish_pairing(PairingTransition { from, to });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;

    /// Pairing store keeping everything in memory.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        pub saved: Arc<std::sync::Mutex<Vec<PairingRecords>>>,
        pub fail: Arc<AtomicBool>,
    }

    impl PairingStore for MemoryStore {
        async fn load(&self) -> Result<PairingRecords, BridgeError> {
            Ok(self.saved.lock().unwrap().last().cloned().unwrap_or_default())
        }

        async fn save(&self, records: &PairingRecords) -> Result<(), BridgeError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(BridgeError::Storage("disk full".into()));
            }
            self.saved.lock().unwrap().push(records.clone());
            Ok(())
        }

        async fn reset(&self) -> Result<(), BridgeError> {
            self.saved.lock().unwrap().clear();
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    fn registry() -> (PairingRegistry<MemoryStore>, MemoryStore, DeviceEvents) {
        let store = MemoryStore::default();
        let events = DeviceEvents::default();
        (
            PairingRegistry::new(store.clone(), PairingRecords::default(), events.clone()),
            store,
            events,
        )
    }

    #[tokio::test]
    async fn should_publish_transition_on_first_pairing_only() {
        let (registry, store, events) = registry();
        let mut rx = events.subscribe_pairing();

        registry.add("a", "00".into(), true).await.unwrap();
        registry.add("b", "01".into(), false).await.unwrap();

        assert!(registry.is_paired());
        assert_eq!(
            rx.recv().await.unwrap(),
            PairingTransition {
                from: PairingState::NotPaired,
                to: PairingState::Paired
            }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(store.saved.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_publish_unpaired_when_last_controller_is_removed() {
        let (registry, _, events) = registry();
        registry.add("a", "00".into(), true).await.unwrap();
        let mut rx = events.subscribe_pairing();

        registry.remove("a").await.unwrap();

        assert!(!registry.is_paired());
        assert_eq!(rx.recv().await.unwrap().to, PairingState::NotPaired);
    }

    #[tokio::test]
    async fn should_fail_to_remove_unknown_controller() {
        let (registry, _, _) = registry();
        let err = registry.remove("ghost").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn should_keep_state_when_store_fails() {
        let (registry, store, events) = registry();
        let mut rx = events.subscribe_pairing();
        store.fail.store(true, Ordering::SeqCst);

        assert!(registry.add("a", "00".into(), true).await.is_err());

        assert!(!registry.is_paired());
        assert!(registry.records().await.controllers.is_empty());
        assert!(rx.try_recv().is_err());
    }
}
