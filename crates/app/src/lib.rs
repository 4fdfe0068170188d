//! # sensorbridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `SensorSource` — best-effort reads of physical sensors
//!   - `DeviceServer` — the accessory-protocol transport
//!   - `PairingStore` — persisted bridge identity and pairings
//!   - `OperatorConsole` — where pairing instructions are shown
//! - Provide the **per-kind device event channels** the transport publishes on
//! - Provide the use-cases:
//!   - `SyncScheduler` — copy sensor readings into the accessory tree
//!   - `LifecycleController` — react to identify, subscription and pairing
//!     events, own the single transport shutdown
//! - Provide `BridgeRuntime`, the one serialized consumer of timer ticks and
//!   device events
//!
//! ## Dependency rule
//! Depends on `sensorbridge-domain` only (plus `tokio` for channels and time).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod context;
pub mod device_events;
pub mod ports;
pub mod runtime;
pub mod services;

#[cfg(test)]
mod testing;
