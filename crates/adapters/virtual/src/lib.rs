//! # sensorbridge-adapter-virtual
//!
//! Virtual sensor source that simulates hardware sensors for testing and
//! demonstration purposes.
//!
//! ## Default sensors
//!
//! | Sensor | Id | Behaviour |
//! |--------|----|-----------|
//! | CPU | `TC0P` | Temperature oscillating around 45 °C |
//! | GPU | `TG0P` | Temperature oscillating around 38 °C, drops every 15th read |
//! | Fan-0 | `0` | RPM ramping between 1200 and 2400 |
//! | Fan-1 | `1` | Never spins |
//!
//! ## Dependency rule
//!
//! Depends on `sensorbridge-app` (port traits) and `sensorbridge-domain` only.

mod devices;

use serde::Deserialize;

use sensorbridge_app::ports::SensorSource;
use sensorbridge_domain::id::SensorId;
use sensorbridge_domain::sensor::SensorDescriptor;

pub use devices::{VirtualFan, VirtualProbe};

/// Which virtual sensors to simulate.
#[derive(Debug, Deserialize)]
pub struct VirtualConfig {
    #[serde(default)]
    pub probes: Vec<VirtualProbe>,
    #[serde(default)]
    pub fans: Vec<VirtualFan>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            probes: vec![
                VirtualProbe::new("TC0P", "CPU", 45.0, 8.0),
                VirtualProbe::new("TG0P", "GPU", 38.0, 4.0).with_dropout_every(15),
            ],
            fans: vec![
                VirtualFan::new("0", "Fan-0", 1200, 2400),
                VirtualFan::new("1", "Fan-1", 0, 0),
            ],
        }
    }
}

/// [`SensorSource`] backed by simulated sensors.
#[derive(Debug, Default)]
pub struct VirtualSensorSource {
    config: VirtualConfig,
}

impl VirtualSensorSource {
    #[must_use]
    pub fn new(config: VirtualConfig) -> Self {
        tracing::debug!(
            probes = config.probes.len(),
            fans = config.fans.len(),
            "virtual sensor source configured"
        );
        Self { config }
    }
}

impl SensorSource for VirtualSensorSource {
    fn descriptors(&self) -> Vec<SensorDescriptor> {
        self.config
            .probes
            .iter()
            .map(VirtualProbe::descriptor)
            .chain(self.config.fans.iter().map(VirtualFan::descriptor))
            .collect()
    }

    fn read_temperature(&self, id: &SensorId) -> Option<f64> {
        self.config
            .probes
            .iter()
            .find(|probe| probe.id == id.as_str())
            .and_then(VirtualProbe::read)
    }

    fn read_fan_rpm(&self, id: &SensorId) -> Option<u32> {
        self.config
            .fans
            .iter()
            .find(|fan| fan.id == id.as_str())
            .and_then(VirtualFan::read)
    }
}
