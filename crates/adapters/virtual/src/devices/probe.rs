//! Virtual temperature probe — a slow sine wave around a base temperature.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use sensorbridge_domain::sensor::SensorDescriptor;

use super::{is_dropout, phase};

/// A simulated temperature probe.
#[derive(Debug, Deserialize)]
pub struct VirtualProbe {
    pub id: String,
    pub name: String,
    /// Centre of the oscillation, in degrees Celsius.
    pub base: f64,
    #[serde(default)]
    pub amplitude: f64,
    /// Number of reads for one full oscillation.
    #[serde(default = "default_period")]
    pub period: u32,
    /// Every n-th read returns nothing.
    #[serde(default)]
    pub dropout_every: Option<u32>,
    #[serde(skip)]
    reads: AtomicU64,
}

fn default_period() -> u32 {
    60
}

impl VirtualProbe {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, base: f64, amplitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base,
            amplitude,
            period: default_period(),
            dropout_every: None,
            reads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_dropout_every(mut self, every: u32) -> Self {
        self.dropout_every = Some(every);
        self
    }

    #[must_use]
    pub fn descriptor(&self) -> SensorDescriptor {
        SensorDescriptor::temperature(self.id.clone(), self.name.clone())
    }

    /// Next reading, rounded to two decimals.
    pub fn read(&self) -> Option<f64> {
        let count = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
        if is_dropout(count, self.dropout_every) {
            return None;
        }
        let angle = phase(count, self.period) * std::f64::consts::TAU;
        let value = self.base + self.amplitude * angle.sin();
        Some((value * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stay_within_amplitude() {
        let probe = VirtualProbe::new("TC0P", "CPU", 45.0, 5.0);
        for _ in 0..200 {
            let value = probe.read().unwrap();
            assert!((40.0..=50.0).contains(&value), "{value}");
        }
    }

    #[test]
    fn should_be_constant_without_amplitude() {
        let probe = VirtualProbe::new("TC0P", "CPU", 45.37, 0.0);
        assert_eq!(probe.read(), Some(45.37));
        assert_eq!(probe.read(), Some(45.37));
    }

    #[test]
    fn should_return_nothing_on_dropout() {
        let probe = VirtualProbe::new("TG0P", "GPU", 40.0, 0.0).with_dropout_every(2);
        assert_eq!(probe.read(), Some(40.0));
        assert_eq!(probe.read(), None);
        assert_eq!(probe.read(), Some(40.0));
    }

    #[test]
    fn should_describe_itself_as_temperature_sensor() {
        let descriptor = VirtualProbe::new("TC0P", "CPU", 45.0, 0.0).descriptor();
        assert_eq!(descriptor, SensorDescriptor::temperature("TC0P", "CPU"));
    }
}
