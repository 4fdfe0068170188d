//! Sync scheduler — copies sensor readings into the accessory tree.
//!
//! The bindings between sensors and characteristics are resolved once, when
//! the scheduler is built. Every [`tick`](SyncScheduler::tick) then reads each
//! bound sensor and writes what it got:
//!
//! | Sensor | Reading | Effect |
//! |--------|---------|--------|
//! | temperature | `Some(celsius)` | `currentTemperature = celsius` |
//! | fan | `Some(rpm)` | `powerState = rpm > 0`, `rotationSpeed = rpm` |
//! | any | `None` | nothing is written, the previous value stays |

use std::sync::Arc;
use std::time::Duration;

use sensorbridge_domain::characteristic::{Characteristic, CharacteristicKind};
use sensorbridge_domain::error::ValidationError;
use sensorbridge_domain::sensor::{SensorDescriptor, SensorKind};
use sensorbridge_domain::service::ServiceKind;

use crate::context::BridgeContext;

/// Timing of the synchronisation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub poll_period: Duration,
    /// Delay before the first tick.
    pub initial_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_secs(1),
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sensors whose reading was written into the tree.
    pub updated: usize,
    /// Sensors that returned no reading.
    pub missing: usize,
    /// Sensors whose reading the model refused.
    pub rejected: usize,
}

enum Target {
    Temperature(Arc<Characteristic>),
    Fan {
        power: Arc<Characteristic>,
        speed: Arc<Characteristic>,
    },
}

struct Binding {
    sensor: SensorDescriptor,
    target: Target,
}

/// Periodically mirrors the hardware into the accessory tree.
pub struct SyncScheduler {
    context: BridgeContext,
    config: SyncConfig,
    bindings: Vec<Binding>,
}

impl SyncScheduler {
    /// Resolve the sensor bindings from the context's tree.
    ///
    /// Sensor accessories missing the expected characteristic are skipped
    /// with a warning.
    #[must_use]
    pub fn new(context: BridgeContext, config: SyncConfig) -> Self {
        let bindings = context
            .tree
            .sensor_accessories()
            .filter_map(|(accessory, sensor)| {
                let target = match sensor.kind {
                    SensorKind::Temperature => accessory
                        .characteristic(
                            ServiceKind::TemperatureSensor,
                            CharacteristicKind::CurrentTemperature,
                        )
                        .cloned()
                        .map(Target::Temperature),
                    SensorKind::Fan => {
                        let power = accessory
                            .characteristic(ServiceKind::Fan, CharacteristicKind::PowerState);
                        let speed = accessory
                            .characteristic(ServiceKind::Fan, CharacteristicKind::RotationSpeed);
                        power.zip(speed).map(|(power, speed)| Target::Fan {
                            power: Arc::clone(power),
                            speed: Arc::clone(speed),
                        })
                    }
                };
                if target.is_none() {
                    tracing::warn!(sensor = %sensor.id, aid = %accessory.aid(), "sensor accessory has no matching characteristic, skipping");
                }
                target.map(|target| Binding {
                    sensor: sensor.clone(),
                    target,
                })
            })
            .collect();

        Self {
            context,
            config,
            bindings,
        }
    }

    #[must_use]
    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Number of sensors this scheduler synchronises.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Read every bound sensor once and write the readings into the tree.
    ///
    /// Never fails: a rejected reading is logged and counted, and the
    /// remaining sensors still run.
    pub fn tick(&self) -> TickReport {
        let mut report = TickReport::default();
        for binding in &self.bindings {
            match self.sync(binding) {
                Some(Ok(())) => report.updated += 1,
                None => report.missing += 1,
                Some(Err(err)) => {
                    tracing::warn!(sensor = %binding.sensor.id, error = %err, "sensor reading rejected");
                    report.rejected += 1;
                }
            }
        }
        tracing::trace!(?report, "sync tick");
        report
    }

    fn sync(&self, binding: &Binding) -> Option<Result<(), ValidationError>> {
        let sensors = &self.context.sensors;
        match &binding.target {
            Target::Temperature(current) => {
                let celsius = sensors.read_temperature(&binding.sensor.id)?;
                Some(current.write(celsius))
            }
            Target::Fan { power, speed } => {
                let rpm = sensors.read_fan_rpm(&binding.sensor.id)?;
                Some(
                    power
                        .write(rpm > 0)
                        .and_then(|()| speed.write(f64::from(rpm))),
                )
            }
        }
    }
}
