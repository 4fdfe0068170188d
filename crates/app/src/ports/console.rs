//! Operator console port — where the bridge talks to the person running it.

use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::PairingInstructions;

/// Shows pairing instructions to the operator.
pub trait OperatorConsole: Send + Sync {
    /// Render the instructions.
    ///
    /// # Errors
    ///
    /// Returns an error when the output cannot be written; callers log it and
    /// carry on.
    fn show(&self, instructions: &PairingInstructions) -> Result<(), BridgeError>;
}
