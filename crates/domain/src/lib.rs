//! # sensorbridge-domain
//!
//! Pure domain model for the sensorbridge hardware-to-smart-home bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Accessories** (addressable devices exposed by the bridge)
//! - Define **Services** (typed capability groups: info, fan, temperature sensor)
//! - Define **Characteristics** (typed, observable value cells with permissions
//!   and range metadata) and their write/notify contract
//! - Define **Sensor descriptors** (which physical sensor backs which accessory)
//! - Define **Pairing** value objects (setup code, setup payload, instructions)
//! - Define the **events** raised by the model and the observer seam through
//!   which the transport receives them
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod accessory;
pub mod characteristic;
pub mod event;
pub mod pairing;
pub mod sensor;
pub mod service;
