//! Typed identifier newtypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_instance_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw protocol identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Access the raw protocol identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_instance_id!(
    /// Accessory instance id (`aid`). The bridge itself is always `1`.
    AccessoryId
);

define_instance_id!(
    /// Service or characteristic instance id (`iid`), unique within an accessory.
    InstanceId
);

impl AccessoryId {
    /// The aid reserved for the bridge accessory.
    pub const BRIDGE: Self = Self(1);
}

/// Routing key of a characteristic: `(aid, iid)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacteristicKey {
    pub aid: AccessoryId,
    pub iid: InstanceId,
}

impl CharacteristicKey {
    #[must_use]
    pub const fn new(aid: AccessoryId, iid: InstanceId) -> Self {
        Self { aid, iid }
    }
}

impl fmt::Display for CharacteristicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.aid, self.iid)
    }
}

/// Error returned when a `aid.iid` pair cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid characteristic key {0:?}, expected `aid.iid`")]
pub struct ParseKeyError(String);

impl FromStr for CharacteristicKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (aid, iid) = s
            .split_once('.')
            .ok_or_else(|| ParseKeyError(s.to_string()))?;
        let aid = aid.parse().map_err(|_| ParseKeyError(s.to_string()))?;
        let iid = iid.parse().map_err(|_| ParseKeyError(s.to_string()))?;
        Ok(Self::new(aid, iid))
    }
}

/// Identifier of a physical sensor as reported by the sensor source
/// (e.g. an SMC key or a fan index).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bridge identity advertised to controllers, formatted like a MAC address
/// (`AA:BB:CC:DD:EE:FF`). Generated once and persisted with the pairings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentifier(String);

impl Default for DeviceIdentifier {
    fn default() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let text = bytes[..6]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":");
        Self(text)
    }
}

impl DeviceIdentifier {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
