//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use sensorbridge_domain::accessory::{AccessoryInfo, AccessoryTree, Category};
use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::id::SensorId;
use sensorbridge_domain::pairing::{PairingInstructions, SetupCode, SetupId, SetupPayload};
use sensorbridge_domain::sensor::SensorDescriptor;

use crate::context::BridgeContext;
use crate::device_events::DeviceEvents;
use crate::ports::{DeviceServer, OperatorConsole, SensorSource};

#[derive(Clone, Default)]
pub struct StubSensors {
    descriptors: Vec<SensorDescriptor>,
    temperatures: Arc<Mutex<HashMap<String, f64>>>,
    rpms: Arc<Mutex<HashMap<String, u32>>>,
    reads: Arc<AtomicUsize>,
    cancel_on_read: Arc<Mutex<Option<CancellationToken>>>,
}

impl StubSensors {
    /// Two temperature probes and one fan, none of them readable yet.
    pub fn standard() -> Self {
        Self {
            descriptors: vec![
                SensorDescriptor::temperature("TC0P", "CPU"),
                SensorDescriptor::temperature("TG0P", "GPU"),
                SensorDescriptor::fan("0", "Fan-0"),
            ],
            ..Self::default()
        }
    }

    pub fn set_temperature(&self, id: &str, value: Option<f64>) {
        let mut temperatures = self.temperatures.lock().unwrap();
        match value {
            Some(v) => temperatures.insert(id.to_string(), v),
            None => temperatures.remove(id),
        };
    }

    pub fn set_rpm(&self, id: &str, value: Option<u32>) {
        let mut rpms = self.rpms.lock().unwrap();
        match value {
            Some(v) => rpms.insert(id.to_string(), v),
            None => rpms.remove(id),
        };
    }

    /// Cancel `token` from inside every subsequent read.
    pub fn cancel_on_read(&self, token: CancellationToken) {
        *self.cancel_on_read.lock().unwrap() = Some(token);
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.cancel_on_read.lock().unwrap().as_ref() {
            token.cancel();
        }
    }

    /// Total number of reads performed, across all sensors.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SensorSource for StubSensors {
    fn descriptors(&self) -> Vec<SensorDescriptor> {
        self.descriptors.clone()
    }

    fn read_temperature(&self, id: &SensorId) -> Option<f64> {
        self.record_read();
        self.temperatures.lock().unwrap().get(id.as_str()).copied()
    }

    fn read_fan_rpm(&self, id: &SensorId) -> Option<u32> {
        self.record_read();
        self.rpms.lock().unwrap().get(id.as_str()).copied()
    }
}

#[derive(Clone, Default)]
pub struct StubConsole {
    shown: Arc<Mutex<Vec<PairingInstructions>>>,
}

impl StubConsole {
    pub fn shown(&self) -> Vec<PairingInstructions> {
        self.shown.lock().unwrap().clone()
    }
}

impl OperatorConsole for StubConsole {
    fn show(&self, instructions: &PairingInstructions) -> Result<(), BridgeError> {
        self.shown.lock().unwrap().push(instructions.clone());
        Ok(())
    }
}

pub struct StubServer {
    events: DeviceEvents,
    code: SetupCode,
    paired: AtomicBool,
    stops: AtomicUsize,
    fail_stop: bool,
}

impl Default for StubServer {
    fn default() -> Self {
        Self {
            events: DeviceEvents::default(),
            code: "031-45-154".parse().unwrap(),
            paired: AtomicBool::new(false),
            stops: AtomicUsize::new(0),
            fail_stop: false,
        }
    }
}

impl StubServer {
    pub fn failing_stop() -> Self {
        Self {
            fail_stop: true,
            ..Self::default()
        }
    }

    pub fn set_paired(&self, paired: bool) {
        self.paired.store(paired, Ordering::SeqCst);
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl DeviceServer for StubServer {
    fn events(&self) -> &DeviceEvents {
        &self.events
    }

    fn setup_code(&self) -> &SetupCode {
        &self.code
    }

    fn setup_payload(&self) -> SetupPayload {
        let setup_id: SetupId = "TEST".parse().unwrap();
        SetupPayload::new(&self.code, &setup_id, Category::Bridge)
    }

    fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    async fn stop(&self) -> Result<(), BridgeError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(BridgeError::Transport("socket already closed".into()));
        }
        Ok(())
    }
}

pub fn context_with(sensors: &StubSensors, console: &StubConsole) -> BridgeContext {
    let info = AccessoryInfo::builder()
        .name("Test Bridge")
        .serial_number("0001")
        .build()
        .unwrap();
    let tree = AccessoryTree::build(info, &sensors.descriptors());
    BridgeContext::new(
        Arc::new(tree),
        Arc::new(sensors.clone()),
        Arc::new(console.clone()),
        "configuration.json",
    )
}
