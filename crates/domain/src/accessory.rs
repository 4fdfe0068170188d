//! Accessory — a top-level addressable device exposed by the bridge.
//!
//! [`AccessoryTree::build`] constructs the whole tree once at startup from the
//! bridge information and the enumerated sensors. The tree is never
//! restructured afterwards: only characteristic *values* change.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::characteristic::{Characteristic, CharacteristicKind, ObserverSlot, Value};
use crate::error::{BridgeError, ValidationError};
use crate::event::{IdentifyRequest, ModelObserver};
use crate::id::{AccessoryId, CharacteristicKey, InstanceId};
use crate::sensor::{SensorDescriptor, SensorKind};
use crate::service::{Service, ServiceKind};

/// Fixed category tag advertised for an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bridge,
    Fan,
    Sensor,
}

impl Category {
    /// Numeric category code used in the setup payload and advertisement.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Bridge => 2,
            Self::Fan => 3,
            Self::Sensor => 10,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bridge => f.write_str("bridge"),
            Self::Fan => f.write_str("fan"),
            Self::Sensor => f.write_str("sensor"),
        }
    }
}

/// Identity shown in an accessory's Info service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub name: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
    pub firmware_revision: String,
}

impl AccessoryInfo {
    /// Create a builder for constructing an [`AccessoryInfo`].
    #[must_use]
    pub fn builder() -> AccessoryInfoBuilder {
        AccessoryInfoBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Step-by-step builder for [`AccessoryInfo`].
#[derive(Debug, Default)]
pub struct AccessoryInfoBuilder {
    name: Option<String>,
    serial_number: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    firmware_revision: Option<String>,
}

impl AccessoryInfoBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn firmware_revision(mut self, firmware_revision: impl Into<String>) -> Self {
        self.firmware_revision = Some(firmware_revision.into());
        self
    }

    /// Consume the builder, validate, and return an [`AccessoryInfo`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is missing or blank.
    pub fn build(self) -> Result<AccessoryInfo, ValidationError> {
        let info = AccessoryInfo {
            name: self.name.unwrap_or_default(),
            serial_number: self.serial_number.unwrap_or_default(),
            manufacturer: self
                .manufacturer
                .unwrap_or_else(|| "sensorbridge".to_string()),
            model: self.model.unwrap_or_else(|| "Default-Model".to_string()),
            firmware_revision: self
                .firmware_revision
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        };
        info.validate()?;
        Ok(info)
    }
}

/// Id allocation context while one accessory is being built.
pub(crate) struct AccessoryScope {
    aid: AccessoryId,
    next_iid: u64,
    observer: ObserverSlot,
}

impl AccessoryScope {
    fn new(aid: AccessoryId, observer: ObserverSlot) -> Self {
        Self {
            aid,
            next_iid: 1,
            observer,
        }
    }

    pub(crate) fn next_iid(&mut self) -> InstanceId {
        let iid = InstanceId::new(self.next_iid);
        self.next_iid += 1;
        iid
    }

    pub(crate) fn characteristic(
        &mut self,
        service: ServiceKind,
        kind: CharacteristicKind,
        initial: Value,
    ) -> Characteristic {
        let key = CharacteristicKey::new(self.aid, self.next_iid());
        Characteristic::new(key, service, kind, initial, Arc::clone(&self.observer))
    }
}

/// An addressable device: info service plus its typed services.
pub struct Accessory {
    aid: AccessoryId,
    category: Category,
    info: AccessoryInfo,
    services: Vec<Service>,
    sensor: Option<SensorDescriptor>,
    observer: ObserverSlot,
}

impl fmt::Debug for Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessory")
            .field("aid", &self.aid)
            .field("category", &self.category)
            .field("info", &self.info)
            .field("services", &self.services)
            .field("sensor", &self.sensor)
            .finish_non_exhaustive()
    }
}

impl Accessory {
    fn build(
        aid: AccessoryId,
        category: Category,
        info: AccessoryInfo,
        kinds: &[ServiceKind],
        sensor: Option<SensorDescriptor>,
        observer: &ObserverSlot,
    ) -> Self {
        let mut scope = AccessoryScope::new(aid, Arc::clone(observer));
        let mut services = Vec::with_capacity(kinds.len() + 1);
        services.push(Service::build(&mut scope, ServiceKind::Info, &info));
        for &kind in kinds {
            services.push(Service::build(&mut scope, kind, &info));
        }

        Self {
            aid,
            category,
            info,
            services,
            sensor,
            observer: Arc::clone(observer),
        }
    }

    #[must_use]
    pub fn aid(&self) -> AccessoryId {
        self.aid
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// All services, Info first.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    #[must_use]
    pub fn service(&self, kind: ServiceKind) -> Option<&Service> {
        self.services.iter().find(|s| s.kind() == kind)
    }

    /// The sensor backing this accessory, if any.
    #[must_use]
    pub fn sensor(&self) -> Option<&SensorDescriptor> {
        self.sensor.as_ref()
    }

    /// Characteristic `kind` of service `service`, if present.
    #[must_use]
    pub fn characteristic(
        &self,
        service: ServiceKind,
        kind: CharacteristicKind,
    ) -> Option<&Arc<Characteristic>> {
        self.service(service).and_then(|s| s.characteristic(kind))
    }

    /// Characteristic with the given iid together with its service.
    #[must_use]
    pub fn characteristic_by_iid(&self, iid: InstanceId) -> Option<(&Service, &Arc<Characteristic>)> {
        self.services
            .iter()
            .find_map(|s| s.characteristic_by_iid(iid).map(|c| (s, c)))
    }

    /// Ask the accessory to identify itself.
    ///
    /// Has no hardware effect; the request is only forwarded to the observer.
    pub fn identify(&self) {
        if let Some(observer) = self.observer.get() {
            observer.identify_requested(&IdentifyRequest { aid: self.aid });
        }
    }
}

/// The complete bridge: the bridge accessory followed by one accessory per
/// enumerated sensor.
pub struct AccessoryTree {
    accessories: Vec<Accessory>,
    observer: ObserverSlot,
}

impl fmt::Debug for AccessoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessoryTree")
            .field("accessories", &self.accessories)
            .field("observed", &self.observer.get().is_some())
            .finish()
    }
}

impl AccessoryTree {
    /// Build the tree.
    ///
    /// Deterministic: the bridge gets aid `1` and each descriptor gets the
    /// next aid in list order. Temperature sensors become `Sensor`
    /// accessories with a TemperatureSensor service; fans become `Fan`
    /// accessories with a Fan service.
    #[must_use]
    pub fn build(bridge_info: AccessoryInfo, descriptors: &[SensorDescriptor]) -> Self {
        let observer: ObserverSlot = Arc::new(OnceLock::new());
        let mut accessories = Vec::with_capacity(descriptors.len() + 1);

        accessories.push(Accessory::build(
            AccessoryId::BRIDGE,
            Category::Bridge,
            bridge_info.clone(),
            &[],
            None,
            &observer,
        ));

        for (descriptor, aid) in descriptors.iter().zip(2_u64..) {
            let (category, service, model) = match descriptor.kind {
                SensorKind::Temperature => (
                    Category::Sensor,
                    ServiceKind::TemperatureSensor,
                    "Thermometer",
                ),
                SensorKind::Fan => (Category::Fan, ServiceKind::Fan, "Fan"),
            };
            let info = AccessoryInfo {
                name: descriptor.display_name().to_string(),
                serial_number: descriptor.id.to_string(),
                manufacturer: bridge_info.manufacturer.clone(),
                model: model.to_string(),
                firmware_revision: bridge_info.firmware_revision.clone(),
            };
            accessories.push(Accessory::build(
                AccessoryId::new(aid),
                category,
                info,
                &[service],
                Some(descriptor.clone()),
                &observer,
            ));
        }

        Self {
            accessories,
            observer,
        }
    }

    /// Wire the transport observer into every characteristic of the tree.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ObserverAlreadyAttached`] on a second call.
    pub fn attach_observer(&self, observer: Arc<dyn ModelObserver>) -> Result<(), BridgeError> {
        self.observer
            .set(observer)
            .map_err(|_| BridgeError::ObserverAlreadyAttached)
    }

    #[must_use]
    pub fn bridge(&self) -> &Accessory {
        &self.accessories[0]
    }

    /// Every accessory, bridge first.
    #[must_use]
    pub fn accessories(&self) -> &[Accessory] {
        &self.accessories
    }

    #[must_use]
    pub fn accessory(&self, aid: AccessoryId) -> Option<&Accessory> {
        self.accessories.iter().find(|a| a.aid() == aid)
    }

    #[must_use]
    pub fn characteristic(&self, key: CharacteristicKey) -> Option<&Arc<Characteristic>> {
        self.accessory(key.aid)
            .and_then(|a| a.characteristic_by_iid(key.iid))
            .map(|(_, c)| c)
    }

    /// Accessories backed by a physical sensor, in build order.
    pub fn sensor_accessories(&self) -> impl Iterator<Item = (&Accessory, &SensorDescriptor)> {
        self.accessories
            .iter()
            .filter_map(|a| a.sensor().map(|s| (a, s)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::event::ValueChange;

    fn bridge_info() -> AccessoryInfo {
        AccessoryInfo::builder()
            .name("Bridge")
            .serial_number("00001")
            .build()
            .unwrap()
    }

    fn descriptors() -> Vec<SensorDescriptor> {
        vec![
            SensorDescriptor::temperature("TC0P", "CPU"),
            SensorDescriptor::temperature("TG0P", "GPU"),
            SensorDescriptor::fan("0", "Fan-0"),
        ]
    }

    #[test]
    fn should_reject_blank_bridge_name() {
        let result = AccessoryInfo::builder().name("  ").build();
        assert_eq!(result, Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_assign_bridge_aid_one_and_sequential_aids() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let aids: Vec<u64> = tree.accessories().iter().map(|a| a.aid().get()).collect();
        assert_eq!(aids, vec![1, 2, 3, 4]);
        assert_eq!(tree.bridge().category(), Category::Bridge);
    }

    #[test]
    fn should_give_every_accessory_exactly_one_info_service_first() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        for accessory in tree.accessories() {
            let infos = accessory
                .services()
                .iter()
                .filter(|s| s.kind() == ServiceKind::Info)
                .count();
            assert_eq!(infos, 1);
            assert_eq!(accessory.services()[0].kind(), ServiceKind::Info);
        }
    }

    #[test]
    fn should_build_thermometer_from_temperature_descriptor() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let cpu = tree.accessory(AccessoryId::new(2)).unwrap();
        assert_eq!(cpu.category(), Category::Sensor);
        assert_eq!(cpu.name(), "CPU");
        assert_eq!(cpu.info().serial_number, "TC0P");
        assert!(
            cpu.characteristic(
                ServiceKind::TemperatureSensor,
                CharacteristicKind::CurrentTemperature
            )
            .is_some()
        );
    }

    #[test]
    fn should_build_fan_with_required_characteristics() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let fan = tree.accessory(AccessoryId::new(4)).unwrap();
        assert_eq!(fan.category(), Category::Fan);
        let service = fan.service(ServiceKind::Fan).unwrap();
        let kinds: Vec<_> = service.characteristics().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CharacteristicKind::PowerState,
                CharacteristicKind::RotationSpeed,
                CharacteristicKind::RotationDirection,
            ]
        );
    }

    #[test]
    fn should_seed_info_characteristics_from_accessory_info() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let name = tree
            .bridge()
            .characteristic(ServiceKind::Info, CharacteristicKind::Name)
            .unwrap();
        assert_eq!(name.read(), Value::from("Bridge"));
    }

    #[test]
    fn should_build_identical_ids_for_identical_descriptors() {
        let a = AccessoryTree::build(bridge_info(), &descriptors());
        let b = AccessoryTree::build(bridge_info(), &descriptors());

        let keys = |tree: &AccessoryTree| -> Vec<(u64, u64, CharacteristicKind)> {
            tree.accessories()
                .iter()
                .flat_map(|a| a.services().iter())
                .flat_map(|s| s.characteristics().iter())
                .map(|c| (c.key().aid.get(), c.iid().get(), c.kind()))
                .collect()
        };
        assert_eq!(keys(&a), keys(&b));
    }

    #[test]
    fn should_allocate_unique_iids_within_an_accessory() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let fan = tree.accessory(AccessoryId::new(4)).unwrap();
        let mut iids: Vec<u64> = fan.services().iter().map(|s| s.iid().get()).collect();
        iids.extend(
            fan.services()
                .iter()
                .flat_map(|s| s.characteristics().iter())
                .map(|c| c.iid().get()),
        );
        let count = iids.len();
        iids.sort_unstable();
        iids.dedup();
        assert_eq!(iids.len(), count);
    }

    #[test]
    fn should_find_characteristic_by_key() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let speed = tree
            .accessory(AccessoryId::new(4))
            .unwrap()
            .characteristic(ServiceKind::Fan, CharacteristicKind::RotationSpeed)
            .unwrap();
        let found = tree.characteristic(speed.key()).unwrap();
        assert!(Arc::ptr_eq(found, speed));
    }

    #[test]
    fn should_list_only_sensor_backed_accessories() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let ids: Vec<&str> = tree
            .sensor_accessories()
            .map(|(_, s)| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["TC0P", "TG0P", "0"]);
    }

    #[derive(Default)]
    struct Recorder {
        identified: Mutex<Vec<AccessoryId>>,
        changes: Mutex<usize>,
    }

    impl ModelObserver for Recorder {
        fn value_changed(&self, _change: &ValueChange) {
            *self.changes.lock().unwrap() += 1;
        }

        fn push_requested(&self, _change: &ValueChange) {}

        fn identify_requested(&self, request: &IdentifyRequest) {
            self.identified.lock().unwrap().push(request.aid);
        }
    }

    #[test]
    fn should_forward_identify_to_observer() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let recorder = Arc::new(Recorder::default());
        tree.attach_observer(recorder.clone()).unwrap();

        tree.accessory(AccessoryId::new(3)).unwrap().identify();

        assert_eq!(
            *recorder.identified.lock().unwrap(),
            vec![AccessoryId::new(3)]
        );
    }

    #[test]
    fn should_route_writes_of_every_accessory_to_attached_observer() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        let recorder = Arc::new(Recorder::default());
        tree.attach_observer(recorder.clone()).unwrap();

        for (accessory, _) in tree.sensor_accessories() {
            let characteristic = accessory.services()[1].characteristics()[0].clone();
            let value = characteristic.read();
            characteristic.write(value).unwrap();
        }

        assert_eq!(*recorder.changes.lock().unwrap(), 3);
    }

    #[test]
    fn should_reject_second_observer() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        tree.attach_observer(Arc::new(Recorder::default())).unwrap();
        let result = tree.attach_observer(Arc::new(Recorder::default()));
        assert!(matches!(result, Err(BridgeError::ObserverAlreadyAttached)));
    }

    #[test]
    fn should_identify_without_observer_as_no_op() {
        let tree = AccessoryTree::build(bridge_info(), &descriptors());
        tree.bridge().identify();
    }
}
