//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` or an explicit `into_domain` helper.

use crate::characteristic::{CharacteristicKind, Format};

/// Top-level error shared by every crate of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A value or identifier failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up accessory or characteristic does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persisted pairing state could not be read or written.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The accessory transport failed to start or stop.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Output to the operator console failed.
    #[error("unable to write to the operator console")]
    Console(#[source] std::io::Error),

    /// A second observer was attached to an accessory tree.
    #[error("an observer is already attached to the accessory tree")]
    ObserverAlreadyAttached,
}

/// Reasons a value or identifier is rejected by the model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The value does not have the characteristic's declared format.
    #[error("expected a {expected} value, got {actual}")]
    WrongFormat {
        expected: Format,
        actual: &'static str,
    },

    /// The numeric value lies outside the declared range.
    #[error("value {value} is outside of the range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// The value is not one of the enumerated valid values.
    #[error("value {0} is not one of the accepted values")]
    InvalidValue(u8),

    /// NaN or infinite floats are never stored.
    #[error("value must be a finite number")]
    NotFinite,

    /// Controllers may not write this characteristic.
    #[error("characteristic {0} is not writable")]
    NotWritable(CharacteristicKind),

    /// Controllers may not subscribe to this characteristic.
    #[error("characteristic {0} does not support notifications")]
    NotNotifiable(CharacteristicKind),

    #[error("invalid setup code {0:?}")]
    InvalidSetupCode(String),

    #[error("invalid setup id {0:?}")]
    InvalidSetupId(String),

    #[error("name must not be empty")]
    EmptyName,
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
