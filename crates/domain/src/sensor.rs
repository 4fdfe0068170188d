//! Sensor descriptors — which physical sensor backs which accessory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::SensorId;

/// Category of a physical sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// A temperature probe read in degrees Celsius.
    Temperature,
    /// A fan controller read in RPM.
    Fan,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => f.write_str("temperature"),
            Self::Fan => f.write_str("fan"),
        }
    }
}

/// A physical sensor enumerated by the sensor source at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub id: SensorId,
    pub kind: SensorKind,
    pub name: String,
}

impl SensorDescriptor {
    #[must_use]
    pub fn temperature(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SensorId::new(id),
            kind: SensorKind::Temperature,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn fan(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SensorId::new(id),
            kind: SensorKind::Fan,
            name: name.into(),
        }
    }

    /// Name shown to controllers; falls back to the sensor id when empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}
