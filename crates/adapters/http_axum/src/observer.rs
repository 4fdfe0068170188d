//! Bridges the accessory model's notifications onto the server's channels.

use tokio::sync::broadcast;

use sensorbridge_app::device_events::DeviceEvents;
use sensorbridge_domain::event::{IdentifyRequest, ModelObserver, ValueChange};

/// The observer attached to the accessory tree once the server starts.
pub(crate) struct ServerObserver {
    events: DeviceEvents,
    pushes: broadcast::Sender<ValueChange>,
}

impl ServerObserver {
    pub(crate) fn new(events: DeviceEvents, pushes: broadcast::Sender<ValueChange>) -> Self {
        Self { events, pushes }
    }
}

impl ModelObserver for ServerObserver {
    fn value_changed(&self, change: &ValueChange) {
        self.events.publish_change(change.clone());
    }

    fn push_requested(&self, change: &ValueChange) {
        // no live event stream means nobody to push to
        let _ = self.pushes.send(change.clone());
    }

    fn identify_requested(&self, request: &IdentifyRequest) {
        self.events.publish_identify(*request);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use sensorbridge_domain::accessory::{AccessoryInfo, AccessoryTree};
    use sensorbridge_domain::characteristic::CharacteristicKind;
    use sensorbridge_domain::id::AccessoryId;
    use sensorbridge_domain::sensor::SensorDescriptor;
    use sensorbridge_domain::service::ServiceKind;

    fn tree() -> AccessoryTree {
        let info = AccessoryInfo::builder()
            .name("Bridge")
            .serial_number("0001")
            .build()
            .unwrap();
        AccessoryTree::build(info, &[SensorDescriptor::temperature("TC0P", "CPU")])
    }

    #[tokio::test]
    async fn should_forward_changes_and_pushes_to_their_channels() {
        let tree = tree();
        let events = DeviceEvents::default();
        let (pushes, mut push_rx) = broadcast::channel(8);
        let mut changes = events.subscribe_changes();
        tree.attach_observer(Arc::new(ServerObserver::new(events.clone(), pushes)))
            .unwrap();

        let temperature = tree
            .accessory(AccessoryId::new(2))
            .unwrap()
            .characteristic(
                ServiceKind::TemperatureSensor,
                CharacteristicKind::CurrentTemperature,
            )
            .unwrap();
        temperature.write(21.5).unwrap();
        assert_eq!(changes.recv().await.unwrap().new.as_f64(), Some(21.5));
        assert!(push_rx.try_recv().is_err());

        temperature.subscribe("controller-a").unwrap();
        temperature.write(22.0).unwrap();
        assert_eq!(push_rx.recv().await.unwrap().new.as_f64(), Some(22.0));
    }

    #[tokio::test]
    async fn should_forward_identify_requests() {
        let tree = tree();
        let events = DeviceEvents::default();
        let mut identify = events.subscribe_identify();
        tree.attach_observer(Arc::new(ServerObserver::new(
            events.clone(),
            broadcast::channel(8).0,
        )))
        .unwrap();

        tree.bridge().identify();

        assert_eq!(identify.recv().await.unwrap().aid, AccessoryId::BRIDGE);
    }
}
