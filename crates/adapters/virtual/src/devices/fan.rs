//! Virtual fan — RPM ramping up and down between two bounds.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use sensorbridge_domain::sensor::SensorDescriptor;

use super::{is_dropout, phase};

/// A simulated fan.
///
/// A fan configured with `max_rpm = 0` never spins.
#[derive(Debug, Deserialize)]
pub struct VirtualFan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_rpm: u32,
    pub max_rpm: u32,
    /// Number of reads for one ramp up and down.
    #[serde(default = "default_period")]
    pub period: u32,
    #[serde(default)]
    pub dropout_every: Option<u32>,
    #[serde(skip)]
    reads: AtomicU64,
}

fn default_period() -> u32 {
    30
}

impl VirtualFan {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, min_rpm: u32, max_rpm: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            min_rpm,
            max_rpm,
            period: default_period(),
            dropout_every: None,
            reads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> SensorDescriptor {
        SensorDescriptor::fan(self.id.clone(), self.name.clone())
    }

    /// Next reading: a triangle wave from `min_rpm` to `max_rpm` and back.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_lossless
    )]
    pub fn read(&self) -> Option<u32> {
        let count = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
        if is_dropout(count, self.dropout_every) {
            return None;
        }
        let low = self.min_rpm.min(self.max_rpm);
        let high = self.min_rpm.max(self.max_rpm);
        let p = phase(count, self.period);
        let ramp = if p < 0.5 { p * 2.0 } else { (1.0 - p) * 2.0 };
        let span = f64::from(high - low);
        Some(low + (span * ramp).round() as u32)
    }
}
