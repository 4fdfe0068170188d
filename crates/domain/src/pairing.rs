//! Pairing value objects — setup code, setup payload, persisted pairings and
//! the operator-facing instructions rendered from them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::accessory::Category;
use crate::error::ValidationError;
use crate::id::DeviceIdentifier;
use crate::time::Timestamp;

/// Trust state between the bridge and its controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PairingState {
    Paired,
    NotPaired,
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paired => f.write_str("paired"),
            Self::NotPaired => f.write_str("not paired"),
        }
    }
}

/// Eight-digit setup code in the `XXX-XX-XXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetupCode(String);

/// Codes the protocol refuses because they are trivially guessable.
const TRIVIAL_CODES: [&str; 2] = ["12345678", "87654321"];

impl SetupCode {
    /// Digits only, without separators.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }

    /// Numeric value of the eight digits.
    #[must_use]
    pub fn as_number(&self) -> u32 {
        self.digits()
            .bytes()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SetupCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSetupCode(s.to_string());
        let groups: Vec<&str> = s.split('-').collect();
        let shape_ok = groups.len() == 3
            && groups[0].len() == 3
            && groups[1].len() == 2
            && groups[2].len() == 3
            && groups
                .iter()
                .all(|g| g.chars().all(|c| c.is_ascii_digit()));
        if !shape_ok {
            return Err(invalid());
        }

        let digits: String = groups.concat();
        let all_same = digits.chars().all(|c| Some(c) == digits.chars().next());
        if all_same || TRIVIAL_CODES.contains(&digits.as_str()) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SetupCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SetupCode> for String {
    fn from(value: SetupCode) -> Self {
        value.0
    }
}

impl fmt::Display for SetupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-character setup identifier appended to the setup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetupId(String);

impl SetupId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SetupId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 4
            && s
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidSetupId(s.to_string()))
        }
    }
}

impl TryFrom<String> for SetupId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SetupId> for String {
    fn from(value: SetupId) -> Self {
        value.0
    }
}

/// The scannable setup payload (`X-HM://…`) derived from the setup code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPayload {
    uri: String,
}

/// Transport flag for IP accessories.
const FLAG_IP: u64 = 2;

const PAYLOAD_LEN: usize = 9;

impl SetupPayload {
    /// Encode `version(3) | reserved(4) | category(8) | flags(4) | code(27)`
    /// in base 36 and append the setup id.
    #[must_use]
    pub fn new(code: &SetupCode, setup_id: &SetupId, category: Category) -> Self {
        let mut payload: u64 = 0;
        payload <<= 4;
        payload = (payload << 8) | u64::from(category.code());
        payload = (payload << 4) | FLAG_IP;
        payload = (payload << 27) | (u64::from(code.as_number()) & 0x07FF_FFFF);

        let encoded = to_base36(payload);
        let padding = "0".repeat(PAYLOAD_LEN.saturating_sub(encoded.len()));
        Self {
            uri: format!("X-HM://{padding}{encoded}{}", setup_id.as_str()),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for SetupPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[usize::try_from(value % 36).unwrap_or_default()]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Operator-facing instructions shown on startup and when the bridge
/// becomes unpaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingInstructions {
    /// Still paired: the operator must unpair before a new pairing.
    Paired { storage: String },
    /// Not paired: show what a controller needs to pair.
    Unpaired {
        setup_code: SetupCode,
        payload: SetupPayload,
    },
}

impl fmt::Display for PairingInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paired { storage } => write!(
                f,
                "The bridge is paired, either unpair using your controller or remove the pairing file `{storage}`."
            ),
            Self::Unpaired {
                setup_code,
                payload,
            } => write!(
                f,
                "Scan the following setup payload using your controller to pair this bridge:\n\n    {payload}\n\nor enter the setup code {setup_code} manually."
            ),
        }
    }
}

/// A controller that completed pairing with the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerPairing {
    /// Long-term public key of the controller, hex encoded.
    pub public_key: String,
    pub admin: bool,
    pub paired_at: Timestamp,
}

/// Everything persisted between runs: bridge identity and known pairings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRecords {
    pub device_id: DeviceIdentifier,
    /// Bumped whenever the accessory database changes.
    #[serde(default = "default_config_number")]
    pub config_number: u32,
    #[serde(default)]
    pub controllers: BTreeMap<String, ControllerPairing>,
}

fn default_config_number() -> u32 {
    1
}

impl Default for PairingRecords {
    fn default() -> Self {
        Self {
            device_id: DeviceIdentifier::new(),
            config_number: default_config_number(),
            controllers: BTreeMap::new(),
        }
    }
}

impl PairingRecords {
    #[must_use]
    pub fn state(&self) -> PairingState {
        if self.controllers.is_empty() {
            PairingState::NotPaired
        } else {
            PairingState::Paired
        }
    }

    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.state() == PairingState::Paired
    }
}
