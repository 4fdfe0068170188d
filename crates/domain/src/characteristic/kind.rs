//! Predefined characteristic kinds and their fixed metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{Format, RotationDirection, Unit, Value};

/// Access flags of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
    pub notifiable: bool,
}

impl Permissions {
    pub const READ: Self = Self {
        readable: true,
        writable: false,
        notifiable: false,
    };
    pub const WRITE: Self = Self {
        readable: false,
        writable: true,
        notifiable: false,
    };
    pub const READ_NOTIFY: Self = Self {
        readable: true,
        writable: false,
        notifiable: true,
    };
    pub const READ_WRITE_NOTIFY: Self = Self {
        readable: true,
        writable: true,
        notifiable: true,
    };

    /// Protocol permission codes (`pr`, `pw`, `ev`).
    #[must_use]
    pub fn codes(self) -> Vec<&'static str> {
        let mut codes = Vec::with_capacity(3);
        if self.readable {
            codes.push("pr");
        }
        if self.writable {
            codes.push("pw");
        }
        if self.notifiable {
            codes.push("ev");
        }
        codes
    }
}

/// Range, step, unit and enumeration metadata of a characteristic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub unit: Option<Unit>,
    pub valid_values: Option<&'static [u8]>,
}

/// Every characteristic the bridge knows how to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharacteristicKind {
    Identify,
    Manufacturer,
    Model,
    Name,
    SerialNumber,
    FirmwareRevision,
    PowerState,
    RotationSpeed,
    RotationDirection,
    CurrentTemperature,
}

impl CharacteristicKind {
    /// Short-form protocol type code.
    #[must_use]
    pub fn type_code(self) -> &'static str {
        match self {
            Self::Identify => "14",
            Self::Manufacturer => "20",
            Self::Model => "21",
            Self::Name => "23",
            Self::SerialNumber => "30",
            Self::FirmwareRevision => "52",
            Self::PowerState => "25",
            Self::RotationSpeed => "29",
            Self::RotationDirection => "28",
            Self::CurrentTemperature => "11",
        }
    }

    #[must_use]
    pub fn format(self) -> Format {
        match self {
            Self::Identify | Self::PowerState => Format::Bool,
            Self::Manufacturer
            | Self::Model
            | Self::Name
            | Self::SerialNumber
            | Self::FirmwareRevision => Format::String,
            Self::RotationSpeed | Self::CurrentTemperature => Format::Float,
            Self::RotationDirection => Format::UInt8,
        }
    }

    #[must_use]
    pub fn permissions(self) -> Permissions {
        match self {
            Self::Identify => Permissions::WRITE,
            Self::Manufacturer
            | Self::Model
            | Self::Name
            | Self::SerialNumber
            | Self::FirmwareRevision => Permissions::READ,
            Self::PowerState | Self::RotationSpeed | Self::RotationDirection => {
                Permissions::READ_WRITE_NOTIFY
            }
            Self::CurrentTemperature => Permissions::READ_NOTIFY,
        }
    }

    /// rotationSpeed declares no maximum: the synchronisation loop stores raw
    /// RPM there while the unit stays `percentage`.
    #[must_use]
    pub fn constraints(self) -> Constraints {
        match self {
            Self::RotationSpeed => Constraints {
                min: Some(0.0),
                step: Some(1.0),
                unit: Some(Unit::Percentage),
                ..Constraints::default()
            },
            Self::RotationDirection => Constraints {
                min: Some(0.0),
                max: Some(1.0),
                step: Some(1.0),
                valid_values: Some(&RotationDirection::VALID_VALUES),
                ..Constraints::default()
            },
            Self::CurrentTemperature => Constraints {
                min: Some(-270.0),
                max: Some(100.0),
                step: Some(0.1),
                unit: Some(Unit::Celsius),
                ..Constraints::default()
            },
            _ => Constraints::default(),
        }
    }

    /// Value a freshly built characteristic holds before any write.
    #[must_use]
    pub fn initial_value(self) -> Value {
        match self.format() {
            Format::Bool => Value::Bool(false),
            Format::UInt8 => Value::UInt8(0),
            Format::Float => Value::Float(0.0),
            Format::String => Value::String(String::new()),
        }
    }

    #[must_use]
    pub fn as_name(self) -> &'static str {
        match self {
            Self::Identify => "identify",
            Self::Manufacturer => "manufacturer",
            Self::Model => "model",
            Self::Name => "name",
            Self::SerialNumber => "serialNumber",
            Self::FirmwareRevision => "firmwareRevision",
            Self::PowerState => "powerState",
            Self::RotationSpeed => "rotationSpeed",
            Self::RotationDirection => "rotationDirection",
            Self::CurrentTemperature => "currentTemperature",
        }
    }
}

impl fmt::Display for CharacteristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}
