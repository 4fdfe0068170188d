//! Storage-specific error type wrapping file and JSON errors.

use sensorbridge_domain::error::BridgeError;

/// Errors originating from the pairing file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The file could not be read, written or truncated.
    #[error("io error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid pairing records.
    #[error("invalid pairing file {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for BridgeError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
