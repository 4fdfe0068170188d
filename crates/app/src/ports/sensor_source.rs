//! Sensor source port — best-effort reads of physical sensors.

use std::sync::Arc;

use sensorbridge_domain::id::SensorId;
use sensorbridge_domain::sensor::{SensorDescriptor, SensorKind};

/// Reads physical sensors.
///
/// Reads are synchronous and best effort: a sensor that cannot be read
/// right now yields `None`, never an error.
pub trait SensorSource: Send + Sync {
    /// Every sensor available on this host, enumerated once at startup.
    fn descriptors(&self) -> Vec<SensorDescriptor>;

    /// Current temperature of a probe, in degrees Celsius.
    fn read_temperature(&self, id: &SensorId) -> Option<f64>;

    /// Current speed of a fan, in RPM.
    fn read_fan_rpm(&self, id: &SensorId) -> Option<u32>;

    /// Descriptors grouped by kind: temperature probes first, then fans.
    fn grouped_descriptors(&self) -> Vec<SensorDescriptor> {
        let mut all = self.descriptors();
        all.sort_by_key(|d| match d.kind {
            SensorKind::Temperature => 0,
            SensorKind::Fan => 1,
        });
        all
    }
}

impl<T: SensorSource + ?Sized> SensorSource for Arc<T> {
    fn descriptors(&self) -> Vec<SensorDescriptor> {
        (**self).descriptors()
    }

    fn read_temperature(&self, id: &SensorId) -> Option<f64> {
        (**self).read_temperature(id)
    }

    fn read_fan_rpm(&self, id: &SensorId) -> Option<u32> {
        (**self).read_fan_rpm(id)
    }
}
