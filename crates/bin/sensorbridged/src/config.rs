//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `sensorbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use sensorbridge_adapter_virtual::VirtualConfig;
use sensorbridge_app::services::sync_scheduler::SyncConfig;
use sensorbridge_domain::pairing::{SetupCode, SetupId};

const CONFIG_FILE: &str = "sensorbridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity of the bridge accessory.
    pub bridge: BridgeConfig,
    /// HTTP device server settings.
    pub server: ServerConfig,
    /// Pairing file settings.
    pub storage: StorageConfig,
    /// Setup code and id presented to controllers.
    pub pairing: PairingConfig,
    /// Hardware polling.
    pub sync: SyncSection,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated sensors.
    pub sensors: VirtualConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub name: String,
    pub serial_number: String,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Pairing file location.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// `XXX-XX-XXX` code entered on the controller.
    pub setup_code: String,
    /// Four upper-case alphanumerics embedded in the setup URI.
    pub setup_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub poll_period_ms: u64,
    pub initial_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `sensorbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("SENSORBRIDGE_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("SENSORBRIDGE_PORT") {
            self.server.port = val.parse().map_err(|_| {
                ConfigError::Validation(format!("SENSORBRIDGE_PORT is not a port: {val:?}"))
            })?;
        }
        if let Some(val) = lookup("SENSORBRIDGE_STORAGE") {
            self.storage.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("SENSORBRIDGE_SETUP_CODE") {
            self.pairing.setup_code = val;
        }
        if let Some(val) = lookup("SENSORBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.sync.poll_period_ms == 0 {
            return Err(ConfigError::Validation(
                "poll period must be positive".to_string(),
            ));
        }
        self.setup_code()?;
        self.setup_id()?;
        Ok(())
    }

    /// Parsed setup code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the code is malformed.
    pub fn setup_code(&self) -> Result<SetupCode, ConfigError> {
        self.pairing
            .setup_code
            .parse::<SetupCode>()
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// Parsed setup id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the id is malformed.
    pub fn setup_id(&self) -> Result<SetupId, ConfigError> {
        self.pairing
            .setup_id
            .parse::<SetupId>()
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    #[must_use]
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_period: Duration::from_millis(self.sync.poll_period_ms),
            initial_delay: Duration::from_millis(self.sync.initial_delay_ms),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: "Bridge".to_string(),
            serial_number: "00001".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("configuration.json"),
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            setup_code: "123-44-321".to_string(),
            setup_id: "SB01".to_string(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            poll_period_ms: 1000,
            initial_delay_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sensorbridged=info,sensorbridge_app=info,sensorbridge_adapter_http_axum=info,tower_http=debug"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.path, PathBuf::from("configuration.json"));
        assert_eq!(config.bridge.name, "Bridge");
        assert_eq!(config.sensors.probes.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.sync_config(), SyncConfig::default());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [bridge]
            name = 'Office'
            serial_number = '42'

            [server]
            host = '127.0.0.1'
            port = 9090

            [storage]
            path = '/var/lib/sensorbridge/pairings.json'

            [pairing]
            setup_code = '031-45-154'
            setup_id = 'ABCD'

            [sync]
            poll_period_ms = 500
            initial_delay_ms = 0

            [logging]
            filter = 'debug'

            [[sensors.probes]]
            id = 'TC0P'
            name = 'CPU'
            base = 50.0
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bridge.name, "Office");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/sensorbridge/pairings.json")
        );
        assert_eq!(config.setup_code().unwrap().as_str(), "031-45-154");
        assert_eq!(config.setup_id().unwrap().as_str(), "ABCD");
        assert_eq!(config.sync_config().poll_period, Duration::from_millis(500));
        assert_eq!(config.sync_config().initial_delay, Duration::ZERO);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.sensors.probes.len(), 1);
        assert!(config.sensors.fans.is_empty());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("SENSORBRIDGE_HOST", "127.0.0.1"),
                ("SENSORBRIDGE_PORT", "8123"),
                ("SENSORBRIDGE_STORAGE", "state.json"),
                ("SENSORBRIDGE_SETUP_CODE", "031-45-154"),
                ("SENSORBRIDGE_LOG", "warn"),
            ]))
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.storage.path, PathBuf::from("state.json"));
        assert_eq!(config.pairing.setup_code, "031-45-154");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_own_log_variable() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[("SENSORBRIDGE_LOG", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_malformed_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup(&[("SENSORBRIDGE_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_period() {
        let mut config = Config::default();
        config.sync.poll_period_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_trivial_setup_code() {
        let mut config = Config::default();
        config.pairing.setup_code = "123-45-678".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_lower_case_setup_id() {
        let mut config = Config::default();
        config.pairing.setup_id = "ab12".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
