//! Tool settings and per-command parameters
//!
//! Everything the tool reads from its JSON settings store, typed and
//! loaded once at startup.

use crate::commands::CommandCatalog;
use crate::error::{Dlt645Error, Dlt645Result};
use crate::request::CommandRequest;
use dlt645_core::{ProtocolConfig, TransportTuning};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Password and operator code, as hex strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialParams {
    pub password: Option<String>,
    pub usercode: Option<String>,
}

/// Reference values for power and error calibration
///
/// Arrays are ordered phase A, B, C.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    #[serde(flatten)]
    pub credentials: CredentialParams,
    /// Source output mode
    pub phase: u8,
    pub method: u8,
    pub calibration_type: u8,
    pub voltage: [f32; 3],
    pub current: [f32; 3],
    pub active_power: [f32; 3],
    pub reactive_power: [f32; 3],
    pub error: [f32; 3],
}

/// Complete tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub protocol: ProtocolConfig,
    /// Serial line settings, e.g. `"2400,8,E,1"`
    pub serial_settings: String,
    pub port_index: u32,
    pub tuning: TransportTuning,
    /// Address used by the read address command, blank for broadcast
    pub initial_address: String,
    pub new_address: String,
    pub credentials: CredentialParams,
    pub calibration: CalibrationParams,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            serial_settings: "2400,8,E,1".to_string(),
            port_index: 1,
            tuning: TransportTuning::default(),
            initial_address: String::new(),
            new_address: String::new(),
            credentials: CredentialParams::default(),
            calibration: CalibrationParams::default(),
        }
    }
}

impl ToolSettings {
    pub fn from_json_str(json: &str) -> Dlt645Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Dlt645Error::Configuration(format!("Invalid tool settings: {}", e)))?;
        settings.protocol.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Dlt645Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Dlt645Error::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_json_str(&text)?;
        log::info!("Loaded tool settings from {}", path.display());
        Ok(settings)
    }
}

/// The tool's commands, as an operator selects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterCommand {
    ReadAddress,
    WriteAddress,
    EnergyClear,
    PowerAndErrorCalibration,
    TimeCalibration,
    ResetDefault,
}

impl MeterCommand {
    pub const ALL: [MeterCommand; 6] = [
        MeterCommand::ReadAddress,
        MeterCommand::WriteAddress,
        MeterCommand::EnergyClear,
        MeterCommand::PowerAndErrorCalibration,
        MeterCommand::TimeCalibration,
        MeterCommand::ResetDefault,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeterCommand::ReadAddress => "read-address",
            MeterCommand::WriteAddress => "write-address",
            MeterCommand::EnergyClear => "energy-clear",
            MeterCommand::PowerAndErrorCalibration => "power-error-calibration",
            MeterCommand::TimeCalibration => "time-calibration",
            MeterCommand::ResetDefault => "reset-default",
        }
    }

    /// Build the request with parameters taken from the settings
    pub fn request(&self, settings: &ToolSettings) -> CommandRequest {
        let catalog = CommandCatalog::new(&settings.protocol);
        let credentials = &settings.credentials;
        match self {
            MeterCommand::ReadAddress => catalog.read_address_request(&settings.initial_address),
            MeterCommand::WriteAddress => catalog.write_address_request(&settings.new_address),
            MeterCommand::EnergyClear => catalog.energy_clear_request(
                credentials.password.as_deref(),
                credentials.usercode.as_deref(),
            ),
            MeterCommand::PowerAndErrorCalibration => {
                catalog.power_and_error_calibration_request(&settings.calibration)
            }
            MeterCommand::TimeCalibration => catalog.time_calibration_request(),
            MeterCommand::ResetDefault => catalog.reset_default_request(
                credentials.password.as_deref(),
                credentials.usercode.as_deref(),
            ),
        }
    }
}

impl fmt::Display for MeterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeterCommand {
    type Err = Dlt645Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeterCommand::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Dlt645Error::InvalidData(format!("Unknown command: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS_JSON: &str = r#"{
        "protocol": { "address_byte_count": 6, "password_byte_count": 4 },
        "serial_settings": "9600,8,E,1",
        "port_index": 3,
        "tuning": { "response_time_ms": 800 },
        "initial_address": "123456789012",
        "credentials": { "password": "02000000" },
        "calibration": {
            "password": "02000000",
            "phase": 3,
            "voltage": [220.0, 220.0, 220.0]
        }
    }"#;

    #[test]
    fn test_load_settings() {
        let settings = ToolSettings::from_json_str(SETTINGS_JSON).unwrap();
        assert_eq!(settings.port_index, 3);
        assert_eq!(settings.serial_settings, "9600,8,E,1");
        assert_eq!(settings.tuning.response_time().as_millis(), 500);
        assert_eq!(settings.calibration.credentials.password.as_deref(), Some("02000000"));
        assert_eq!(settings.calibration.phase, 3);
        assert_eq!(settings.calibration.current, [0.0; 3]);
        assert!(settings.new_address.is_empty());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(ToolSettings::from_json_str(r#"{"protocol": {"address_byte_count": 0}}"#).is_err());
        assert!(ToolSettings::load("/nonexistent/dlt645.json").is_err());
    }

    #[test]
    fn test_command_names_round_trip() {
        for command in MeterCommand::ALL {
            assert_eq!(command.name().parse::<MeterCommand>().unwrap(), command);
        }
        assert!("format-disk".parse::<MeterCommand>().is_err());
    }

    #[test]
    fn test_request_uses_settings() {
        let settings = ToolSettings::from_json_str(SETTINGS_JSON).unwrap();
        let request = MeterCommand::ReadAddress.request(&settings);
        assert_eq!(request.address().unwrap().to_string(), "123456789012");

        let request = MeterCommand::EnergyClear.request(&settings);
        assert_eq!(&request.data()[..4], &[0x00, 0x00, 0x00, 0x02]);
    }
}
