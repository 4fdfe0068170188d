//! Pairing instructions printed on standard output.

use std::io::Write;

use sensorbridge_app::ports::OperatorConsole;
use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::PairingInstructions;

/// Writes instructions to any [`Write`] sink, stdout in production.
pub struct TextConsole<W> {
    out: std::sync::Mutex<W>,
}

impl TextConsole<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TextConsole<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: std::sync::Mutex::new(out),
        }
    }
}

impl<W: Write + Send> OperatorConsole for TextConsole<W> {
    fn show(&self, instructions: &PairingInstructions) -> Result<(), BridgeError> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "\n{instructions}\n")
            .and_then(|()| out.flush())
            .map_err(BridgeError::Console)
    }
}
