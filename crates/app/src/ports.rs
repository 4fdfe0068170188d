//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod console;
pub mod device_server;
pub mod pairing_store;
pub mod sensor_source;

pub use console::OperatorConsole;
pub use device_server::DeviceServer;
pub use pairing_store::PairingStore;
pub use sensor_source::SensorSource;
