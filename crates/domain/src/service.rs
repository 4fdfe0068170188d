//! Service — a typed group of characteristics within an accessory.
//!
//! The set of characteristics a service carries is fixed by its kind:
//!
//! | Kind | Characteristics |
//! |------|-----------------|
//! | `Info` | identify, manufacturer, model, name, serialNumber, firmwareRevision |
//! | `Fan` | powerState, rotationSpeed, rotationDirection |
//! | `TemperatureSensor` | currentTemperature |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::accessory::{AccessoryInfo, AccessoryScope};
use crate::characteristic::{Characteristic, CharacteristicKind, Value};
use crate::id::InstanceId;

/// Kind of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKind {
    Info,
    Fan,
    TemperatureSensor,
}

impl ServiceKind {
    /// Short-form protocol type code.
    #[must_use]
    pub fn type_code(self) -> &'static str {
        match self {
            Self::Info => "3E",
            Self::Fan => "40",
            Self::TemperatureSensor => "8A",
        }
    }

    /// Characteristics every service of this kind carries, in iid order.
    #[must_use]
    pub fn required_characteristics(self) -> &'static [CharacteristicKind] {
        match self {
            Self::Info => &[
                CharacteristicKind::Identify,
                CharacteristicKind::Manufacturer,
                CharacteristicKind::Model,
                CharacteristicKind::Name,
                CharacteristicKind::SerialNumber,
                CharacteristicKind::FirmwareRevision,
            ],
            Self::Fan => &[
                CharacteristicKind::PowerState,
                CharacteristicKind::RotationSpeed,
                CharacteristicKind::RotationDirection,
            ],
            Self::TemperatureSensor => &[CharacteristicKind::CurrentTemperature],
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Fan => f.write_str("fan"),
            Self::TemperatureSensor => f.write_str("temperatureSensor"),
        }
    }
}

/// A typed capability group of an accessory.
#[derive(Debug)]
pub struct Service {
    iid: InstanceId,
    kind: ServiceKind,
    characteristics: Vec<Arc<Characteristic>>,
}

impl Service {
    /// Allocate ids and build every characteristic required by `kind`.
    ///
    /// Info characteristics are seeded from `info`; everything else starts at
    /// its kind's initial value.
    pub(crate) fn build(scope: &mut AccessoryScope, kind: ServiceKind, info: &AccessoryInfo) -> Self {
        let iid = scope.next_iid();
        let characteristics = kind
            .required_characteristics()
            .iter()
            .map(|&ck| {
                let initial = match ck {
                    CharacteristicKind::Name => Value::from(info.name.as_str()),
                    CharacteristicKind::SerialNumber => Value::from(info.serial_number.as_str()),
                    CharacteristicKind::Manufacturer => Value::from(info.manufacturer.as_str()),
                    CharacteristicKind::Model => Value::from(info.model.as_str()),
                    CharacteristicKind::FirmwareRevision => {
                        Value::from(info.firmware_revision.as_str())
                    }
                    other => other.initial_value(),
                };
                Arc::new(scope.characteristic(kind, ck, initial))
            })
            .collect();

        Self {
            iid,
            kind,
            characteristics,
        }
    }

    #[must_use]
    pub fn iid(&self) -> InstanceId {
        self.iid
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn characteristics(&self) -> &[Arc<Characteristic>] {
        &self.characteristics
    }

    /// Characteristic of the given kind, if this service carries one.
    #[must_use]
    pub fn characteristic(&self, kind: CharacteristicKind) -> Option<&Arc<Characteristic>> {
        self.characteristics.iter().find(|c| c.kind() == kind)
    }

    /// Characteristic with the given instance id.
    #[must_use]
    pub fn characteristic_by_iid(&self, iid: InstanceId) -> Option<&Arc<Characteristic>> {
        self.characteristics.iter().find(|c| c.iid() == iid)
    }
}
