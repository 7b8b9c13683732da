//! Protocol and link tuning configuration
//!
//! Both structures are built once at startup, usually from the JSON
//! settings store, and passed by reference to the frame builders and the
//! transport.

use crate::error::{Dlt645Error, Dlt645Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest field width accepted for addresses, passwords and operator codes
pub const MAX_FIELD_WIDTH: usize = 16;

/// Byte widths and framing options used when building frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Width of the meter address field
    pub address_byte_count: usize,
    /// Width of the password field
    pub password_byte_count: usize,
    /// Width of the operator (user) code field
    pub usercode_byte_count: usize,
    /// Prepend `FE FE FE FE` to every transmitted frame
    pub wake_up_preamble: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            address_byte_count: 6,
            password_byte_count: 4,
            usercode_byte_count: 4,
            wake_up_preamble: false,
        }
    }
}

impl ProtocolConfig {
    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(json: &str) -> Dlt645Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Dlt645Error::Configuration(format!("Invalid protocol config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Dlt645Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Dlt645Error::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded protocol config from {}", path.display());
        Ok(config)
    }

    /// Check the field widths
    pub fn validate(&self) -> Dlt645Result<()> {
        if self.address_byte_count == 0 {
            return Err(Dlt645Error::Configuration(
                "Address width must be at least one byte".to_string(),
            ));
        }
        for (name, width) in [
            ("address", self.address_byte_count),
            ("password", self.password_byte_count),
            ("usercode", self.usercode_byte_count),
        ] {
            if width > MAX_FIELD_WIDTH {
                return Err(Dlt645Error::Configuration(format!(
                    "{} width {} exceeds {} bytes",
                    name, width, MAX_FIELD_WIDTH
                )));
            }
        }
        Ok(())
    }

    /// The all-`0xAA` broadcast address in display order
    pub fn broadcast_address(&self) -> Vec<u8> {
        vec![0xAA; self.address_byte_count]
    }
}

const RESPONSE_TIME_RANGE: (u64, u64) = (20, 500);
const BYTE_INTERVAL_RANGE: (u64, u64) = (0, 500);

/// Link timing for the request/response exchange
///
/// Values are clamped on every write path, including deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTuning", into = "RawTuning")]
pub struct TransportTuning {
    response_time_ms: u64,
    byte_interval_ms: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawTuning {
    response_time_ms: u64,
    byte_interval_ms: u64,
}

impl Default for RawTuning {
    fn default() -> Self {
        Self {
            response_time_ms: RESPONSE_TIME_RANGE.0,
            byte_interval_ms: BYTE_INTERVAL_RANGE.0,
        }
    }
}

impl From<RawTuning> for TransportTuning {
    fn from(raw: RawTuning) -> Self {
        Self::new(raw.response_time_ms, raw.byte_interval_ms)
    }
}

impl From<TransportTuning> for RawTuning {
    fn from(tuning: TransportTuning) -> Self {
        Self {
            response_time_ms: tuning.response_time_ms,
            byte_interval_ms: tuning.byte_interval_ms,
        }
    }
}

impl TransportTuning {
    /// Create tuning, clamping both values into their allowed ranges
    pub fn new(response_time_ms: u64, byte_interval_ms: u64) -> Self {
        let mut tuning = Self {
            response_time_ms: RESPONSE_TIME_RANGE.0,
            byte_interval_ms: BYTE_INTERVAL_RANGE.0,
        };
        tuning.set_response_time_ms(response_time_ms);
        tuning.set_byte_interval_ms(byte_interval_ms);
        tuning
    }

    /// Slave response time, clamped to 20..=500 ms
    pub fn set_response_time_ms(&mut self, millis: u64) {
        self.response_time_ms = millis.clamp(RESPONSE_TIME_RANGE.0, RESPONSE_TIME_RANGE.1);
    }

    /// Maximum gap between reply bytes, clamped to 0..=500 ms
    pub fn set_byte_interval_ms(&mut self, millis: u64) {
        self.byte_interval_ms = millis.clamp(BYTE_INTERVAL_RANGE.0, BYTE_INTERVAL_RANGE.1);
    }

    pub fn response_time(&self) -> Duration {
        Duration::from_millis(self.response_time_ms)
    }

    pub fn byte_interval(&self) -> Duration {
        Duration::from_millis(self.byte_interval_ms)
    }
}

impl Default for TransportTuning {
    fn default() -> Self {
        RawTuning::default().into()
    }
}
