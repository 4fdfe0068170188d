//! # sensorbridge-adapter-storage-file
//!
//! Persists the bridge identity and its controller pairings in a single JSON
//! file (`configuration.json` by default).
//!
//! ## Responsibilities
//! - Implement the [`PairingStore`](sensorbridge_app::ports::PairingStore)
//!   port defined in `sensorbridge-app`
//! - Treat a missing or empty file as "never paired"
//! - Write atomically (temporary file, then rename)
//!
//! ## Dependency rule
//! Depends on `sensorbridge-app` (for port traits) and `sensorbridge-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

mod error;
mod pairing_file;

pub use error::StorageError;
pub use pairing_file::JsonPairingStore;
