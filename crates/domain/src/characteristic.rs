//! Characteristic — a single typed, observable value cell.
//!
//! A characteristic holds its current [`Value`] and subscriber set behind a
//! lock. Observers are always invoked *after* the lock is released, so an
//! observer is free to call back into the model (read, write, subscribe).

mod kind;
mod value;

pub use kind::{CharacteristicKind, Constraints, Permissions};
pub use value::{Format, RotationDirection, Unit, Value};

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::ValidationError;
use crate::event::{ModelObserver, ValueChange};
use crate::id::{CharacteristicKey, InstanceId};
use crate::service::ServiceKind;

/// Observer slot shared by every characteristic of one accessory tree.
pub(crate) type ObserverSlot = Arc<OnceLock<Arc<dyn ModelObserver>>>;

struct Cell {
    value: Value,
    subscribers: BTreeSet<String>,
}

/// A typed value cell with permissions, metadata and subscribers.
pub struct Characteristic {
    key: CharacteristicKey,
    service: ServiceKind,
    kind: CharacteristicKind,
    constraints: Constraints,
    cell: Mutex<Cell>,
    observer: ObserverSlot,
}

impl std::fmt::Debug for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Characteristic")
            .field("key", &self.key)
            .field("service", &self.service)
            .field("kind", &self.kind)
            .field("value", &self.read())
            .finish_non_exhaustive()
    }
}

impl Characteristic {
    pub(crate) fn new(
        key: CharacteristicKey,
        service: ServiceKind,
        kind: CharacteristicKind,
        initial: Value,
        observer: ObserverSlot,
    ) -> Self {
        Self {
            key,
            service,
            kind,
            constraints: kind.constraints(),
            cell: Mutex::new(Cell {
                value: initial,
                subscribers: BTreeSet::new(),
            }),
            observer,
        }
    }

    #[must_use]
    pub fn key(&self) -> CharacteristicKey {
        self.key
    }

    #[must_use]
    pub fn iid(&self) -> InstanceId {
        self.key.iid
    }

    #[must_use]
    pub fn kind(&self) -> CharacteristicKind {
        self.kind
    }

    /// Kind of the service that owns this characteristic.
    #[must_use]
    pub fn service(&self) -> ServiceKind {
        self.service
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.kind.format()
    }

    #[must_use]
    pub fn permissions(&self) -> Permissions {
        self.kind.permissions()
    }

    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Current value. Never fails.
    #[must_use]
    pub fn read(&self) -> Value {
        self.lock().value.clone()
    }

    /// Validate and store `value`.
    ///
    /// On success the change listener is invoked with `(old, new)` even when
    /// both are equal, and a push notification is requested when the
    /// characteristic has at least one subscriber.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the value has the wrong format,
    /// lies outside the declared range, or is not an accepted enumeration
    /// value. The stored value is left untouched in that case.
    pub fn write(&self, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        self.validate(&value)?;

        let (old, has_subscribers) = {
            let mut cell = self.lock();
            let old = std::mem::replace(&mut cell.value, value.clone());
            (old, !cell.subscribers.is_empty())
        };

        if let Some(observer) = self.observer.get() {
            let change = ValueChange {
                key: self.key,
                service: self.service,
                characteristic: self.kind,
                old,
                new: value,
            };
            observer.value_changed(&change);
            if has_subscribers {
                observer.push_requested(&change);
            }
        }
        Ok(())
    }

    /// Write originating from a paired controller.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotWritable`] when the characteristic lacks
    /// the writable permission, otherwise behaves like [`write`](Self::write).
    pub fn write_from_controller(&self, value: impl Into<Value>) -> Result<(), ValidationError> {
        if !self.permissions().writable {
            return Err(ValidationError::NotWritable(self.kind));
        }
        self.write(value)
    }

    /// Register `subscriber` for push notifications.
    ///
    /// Returns `true` when the subscriber was not registered yet.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotNotifiable`] when the characteristic
    /// does not support notifications.
    pub fn subscribe(&self, subscriber: &str) -> Result<bool, ValidationError> {
        if !self.permissions().notifiable {
            return Err(ValidationError::NotNotifiable(self.kind));
        }
        Ok(self.lock().subscribers.insert(subscriber.to_string()))
    }

    /// Remove `subscriber`. Returns `true` when it was registered.
    pub fn unsubscribe(&self, subscriber: &str) -> bool {
        self.lock().subscribers.remove(subscriber)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    #[must_use]
    pub fn is_subscribed(&self, subscriber: &str) -> bool {
        self.lock().subscribers.contains(subscriber)
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let expected = self.format();
        if value.format() != expected {
            return Err(ValidationError::WrongFormat {
                expected,
                actual: value.format().as_name(),
            });
        }

        if let Some(number) = value.as_f64() {
            if !number.is_finite() {
                return Err(ValidationError::NotFinite);
            }
            let min = self.constraints.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.constraints.max.unwrap_or(f64::INFINITY);
            if number < min || number > max {
                return Err(ValidationError::OutOfRange {
                    value: number,
                    min,
                    max,
                });
            }
        }

        if let (Some(valid), Some(raw)) = (self.constraints.valid_values, value.as_u8()) {
            if !valid.contains(&raw) {
                return Err(ValidationError::InvalidValue(raw));
            }
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Cell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
