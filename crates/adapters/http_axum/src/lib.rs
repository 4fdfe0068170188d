//! # sensorbridge-adapter-http-axum
//!
//! Local device server built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Implement the [`DeviceServer`](sensorbridge_app::ports::DeviceServer)
//!   port: own the listener, report controller activity on the per-kind
//!   device event channels, stop exactly once
//! - Serve the accessory tree in the accessory-protocol JSON shape
//!   (`/accessories`, `/characteristics`)
//! - Stream push notifications for subscribed characteristics (`/events`)
//! - Record and remove controller pairings (`/pairings`) in the pairing store
//!
//! ## Not covered
//! The transport is plain HTTP on the local network. The cryptographic pair
//! setup, pair verify and session encryption of the real protocol are not
//! implemented; `/pairings` stands in for the handshake.
//!
//! ## Dependency rule
//! Depends on `sensorbridge-app` (for port traits) and `sensorbridge-domain`
//! (for domain types used in request/response mapping). Never leaks axum
//! types into the domain.

pub mod api;
pub mod error;
mod observer;
pub mod pairing;
pub mod router;
pub mod server;
pub mod state;

pub use server::{LocalDeviceServer, ServerConfig};
