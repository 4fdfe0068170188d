//! Typed characteristic values and their wire formats.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Declared storage format of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bool,
    #[serde(rename = "uint8")]
    UInt8,
    Float,
    String,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

/// A single characteristic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    UInt8(u8),
    Float(f64),
    String(String),
}

impl Value {
    /// The format this value natively belongs to.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::Bool(_) => Format::Bool,
            Self::UInt8(_) => Format::UInt8,
            Self::Float(_) => Format::Float,
            Self::String(_) => Format::String,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::UInt8(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::UInt8(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convert a controller-supplied JSON value into the given format.
    ///
    /// Controllers encode booleans as `0`/`1` and send integral numbers for
    /// float characteristics, so those encodings are accepted. Anything else
    /// is a [`ValidationError::WrongFormat`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongFormat`] when the JSON value cannot
    /// represent `format`.
    pub fn from_json(json: &serde_json::Value, format: Format) -> Result<Self, ValidationError> {
        let wrong = || ValidationError::WrongFormat {
            expected: format,
            actual: json_kind(json),
        };
        match (format, json) {
            (Format::Bool, serde_json::Value::Bool(b)) => Ok(Self::Bool(*b)),
            (Format::Bool, serde_json::Value::Number(n)) => match n.as_u64() {
                Some(0) => Ok(Self::Bool(false)),
                Some(1) => Ok(Self::Bool(true)),
                _ => Err(wrong()),
            },
            (Format::UInt8, serde_json::Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .map(Self::UInt8)
                .ok_or_else(wrong),
            (Format::Float, serde_json::Value::Number(n)) => {
                n.as_f64().map(Self::Float).ok_or_else(wrong)
            }
            (Format::String, serde_json::Value::String(s)) => Ok(Self::String(s.clone())),
            _ => Err(wrong()),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::UInt8(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::UInt8(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Unit declared on numeric characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Percentage,
    Celsius,
}

/// Direction of a fan's rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Encoded values accepted by the `rotationDirection` characteristic.
    pub const VALID_VALUES: [u8; 2] = [0, 1];
}

impl From<RotationDirection> for Value {
    fn from(value: RotationDirection) -> Self {
        match value {
            RotationDirection::Clockwise => Self::UInt8(0),
            RotationDirection::CounterClockwise => Self::UInt8(1),
        }
    }
}

impl TryFrom<&Value> for RotationDirection {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::UInt8(0) => Ok(Self::Clockwise),
            Value::UInt8(1) => Ok(Self::CounterClockwise),
            Value::UInt8(other) => Err(ValidationError::InvalidValue(*other)),
            other => Err(ValidationError::WrongFormat {
                expected: Format::UInt8,
                actual: other.format().as_name(),
            }),
        }
    }
}

impl Format {
    /// Lowercase name used in error messages and on the wire.
    #[must_use]
    pub fn as_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::UInt8 => "uint8",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}
