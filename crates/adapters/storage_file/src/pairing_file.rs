//! JSON file implementation of [`PairingStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::pairing::PairingRecords;

use crate::error::StorageError;

/// Pairing records stored as pretty-printed JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonPairingStore {
    path: PathBuf,
}

impl JsonPairingStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<PairingRecords, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no pairing file, starting unpaired");
                return Ok(PairingRecords::default());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), "empty pairing file, starting unpaired");
            return Ok(PairingRecords::default());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Json {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn ensure_parent(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error(err))?;
        }
        Ok(())
    }

    async fn write(&self, records: &PairingRecords) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(records).map_err(|source| StorageError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        self.ensure_parent().await?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|err| self.io_error(err))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|err| self.io_error(err))
    }
}

impl PairingStore for JsonPairingStore {
    fn load(&self) -> impl Future<Output = Result<PairingRecords, BridgeError>> + Send {
        async move { Ok(self.read().await?) }
    }

    fn save(
        &self,
        records: &PairingRecords,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        async move {
            self.write(records).await?;
            tracing::debug!(path = %self.path.display(), controllers = records.controllers.len(), "pairing file saved");
            Ok(())
        }
    }

    fn reset(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        async move {
            self.ensure_parent().await?;
            tokio::fs::write(&self.path, b"")
                .await
                .map_err(|err| self.io_error(err))?;
            tracing::info!(path = %self.path.display(), "pairing file reset");
            Ok(())
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
