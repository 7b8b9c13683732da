//! Command catalog
//!
//! Builders for the tool's fixed set of meter commands. Each builder
//! composes the plain data field from sub-fields and hands framing to the
//! frame layer. The `*_request` variants return the unframed
//! [`CommandRequest`] so a client can chain continuation frames.

use crate::error::Dlt645Result;
use crate::params::CalibrationParams;
use crate::request::CommandRequest;
use dlt645_core::numeric::{
    float_to_little_endian, hex_to_little_endian, DEFAULT_FLOAT_WIDTH, POWER_FIELD_WIDTH,
};
use dlt645_core::{MeterTime, ProtocolConfig};
use dlt645_frame::{ControlCode, FunctionCode, MeterAddress};

/// Data identifier of the power and error calibration command
pub const DI_POWER_ERROR_CALIBRATION: [u8; 4] = [0x02, 0x80, 0xFF, 0x01];

/// Data identifier of the time calibration command
pub const DI_TIME_CALIBRATION: [u8; 4] = [0x02, 0x80, 0xFF, 0x02];

/// Data identifier of the factory reset command
pub const DI_RESET_DEFAULT: [u8; 4] = [0x02, 0x80, 0xFF, 0x00];

/// Parameter byte that requests the factory reset
const RESET_DEFAULT_FLAG: u8 = 0x01;

/// Builds command frames for one protocol configuration
#[derive(Debug, Clone, Copy)]
pub struct CommandCatalog<'a> {
    config: &'a ProtocolConfig,
}

impl<'a> CommandCatalog<'a> {
    pub fn new(config: &'a ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        self.config
    }

    /// Read the communication address; blank input targets the broadcast address
    pub fn read_address_request(&self, address: &str) -> CommandRequest {
        let address = MeterAddress::from_hex_or_broadcast(address, self.config.address_byte_count);
        CommandRequest::new(
            "read address",
            ControlCode::command(FunctionCode::ReadAddress),
            Vec::new(),
            Some(address),
        )
    }

    pub fn read_address(&self, address: &str) -> Dlt645Result<Vec<u8>> {
        self.read_address_request(address).build(self.config)
    }

    /// Write a new communication address, sent to the broadcast address
    ///
    /// Blank input writes the broadcast address itself.
    pub fn write_address_request(&self, new_address: &str) -> CommandRequest {
        let width = self.config.address_byte_count;
        let mut data = hex_to_little_endian(new_address, Some(width));
        if data.is_empty() {
            data = self.config.broadcast_address();
        }
        CommandRequest::new(
            "write address",
            ControlCode::command(FunctionCode::WriteAddress),
            data,
            None,
        )
    }

    pub fn write_address(&self, new_address: &str) -> Dlt645Result<Vec<u8>> {
        self.write_address_request(new_address).build(self.config)
    }

    /// Clear the energy registers
    ///
    /// Data field: password ‖ operator code, both low byte first.
    pub fn energy_clear_request(&self, password: Option<&str>, usercode: Option<&str>) -> CommandRequest {
        let mut data = self.password(password);
        data.extend(self.usercode(usercode));
        CommandRequest::new(
            "energy clear",
            ControlCode::command(FunctionCode::WriteAddress),
            data,
            None,
        )
    }

    pub fn energy_clear(&self, password: Option<&str>, usercode: Option<&str>) -> Dlt645Result<Vec<u8>> {
        self.energy_clear_request(password, usercode).build(self.config)
    }

    /// Calibrate power and error against reference values
    ///
    /// Every sub-field is reversed from its low-byte-first encoding before
    /// concatenation, so the identifier travels low byte first while the
    /// credentials and measurements travel high byte first.
    pub fn power_and_error_calibration_request(&self, params: &CalibrationParams) -> CommandRequest {
        let mut fields: Vec<Vec<u8>> = vec![
            DI_POWER_ERROR_CALIBRATION.to_vec(),
            self.password(params.credentials.password.as_deref()),
            self.usercode(params.credentials.usercode.as_deref()),
            vec![params.phase],
            vec![params.method],
            vec![params.calibration_type],
        ];
        fields.extend(params.voltage.iter().map(|&v| float_to_little_endian(v, DEFAULT_FLOAT_WIDTH)));
        fields.extend(params.current.iter().map(|&v| float_to_little_endian(v, DEFAULT_FLOAT_WIDTH)));
        fields.extend(params.active_power.iter().map(|&v| float_to_little_endian(v, POWER_FIELD_WIDTH)));
        fields.extend(params.reactive_power.iter().map(|&v| float_to_little_endian(v, POWER_FIELD_WIDTH)));
        fields.extend(params.error.iter().map(|&v| float_to_little_endian(v, DEFAULT_FLOAT_WIDTH)));

        let data = fields
            .into_iter()
            .flat_map(|field| field.into_iter().rev())
            .collect();

        CommandRequest::new(
            "power and error calibration",
            ControlCode::command(FunctionCode::ReadData),
            data,
            None,
        )
    }

    pub fn power_and_error_calibration(&self, params: &CalibrationParams) -> Dlt645Result<Vec<u8>> {
        self.power_and_error_calibration_request(params).build(self.config)
    }

    /// Set the meter clock to `time`
    ///
    /// Data field: identifier (low byte first) ‖ second, minute, hour, day,
    /// month, year as raw bytes.
    pub fn time_calibration_request_at(&self, time: MeterTime) -> CommandRequest {
        let mut data: Vec<u8> = DI_TIME_CALIBRATION.iter().rev().copied().collect();
        data.extend_from_slice(&time.to_bytes());
        CommandRequest::new(
            "time calibration",
            ControlCode::command(FunctionCode::BroadcastTimeSync),
            data,
            None,
        )
    }

    /// Set the meter clock to the local time
    pub fn time_calibration_request(&self) -> CommandRequest {
        self.time_calibration_request_at(MeterTime::now())
    }

    pub fn time_calibration(&self) -> Dlt645Result<Vec<u8>> {
        self.time_calibration_request().build(self.config)
    }

    /// Restore factory settings
    ///
    /// Data field: identifier ‖ password ‖ operator code ‖ `01`.
    pub fn reset_default_request(&self, password: Option<&str>, usercode: Option<&str>) -> CommandRequest {
        let mut data: Vec<u8> = DI_RESET_DEFAULT.iter().rev().copied().collect();
        data.extend(self.password(password));
        data.extend(self.usercode(usercode));
        data.push(RESET_DEFAULT_FLAG);
        CommandRequest::new(
            "reset default",
            ControlCode::command(FunctionCode::ReadData),
            data,
            None,
        )
    }

    pub fn reset_default(&self, password: Option<&str>, usercode: Option<&str>) -> Dlt645Result<Vec<u8>> {
        self.reset_default_request(password, usercode).build(self.config)
    }

    fn password(&self, value: Option<&str>) -> Vec<u8> {
        credential(value, self.config.password_byte_count)
    }

    fn usercode(&self, value: Option<&str>) -> Vec<u8> {
        credential(value, self.config.usercode_byte_count)
    }
}

/// Low-byte-first credential of a fixed width, zeros when absent
fn credential(value: Option<&str>, width: usize) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let bytes = hex_to_little_endian(value.unwrap_or_default(), Some(width));
    if bytes.is_empty() { vec![0; width] } else { bytes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CredentialParams;
    use dlt645_frame::{parse_frame, SumCheck};

    fn config() -> ProtocolConfig {
        ProtocolConfig::default()
    }

    fn checksum_holds(frame: &[u8]) -> bool {
        let n = frame.len();
        SumCheck::of(&frame[..n - 2]) == frame[n - 2]
    }

    #[test]
    fn test_read_address_frame() {
        let config = config();
        let frame = CommandCatalog::new(&config).read_address("123456789012").unwrap();
        assert_eq!(
            frame,
            vec![0x68, 0x12, 0x90, 0x78, 0x56, 0x34, 0x12, 0x68, 0x13, 0x00, 0x99, 0x16]
        );
    }

    #[test]
    fn test_read_address_blank_uses_broadcast() {
        let config = config();
        let frame = CommandCatalog::new(&config).read_address(" ").unwrap();
        assert_eq!(&frame[1..7], &[0xAA; 6]);
        assert_eq!(frame[10], 0xDF);
    }

    #[test]
    fn test_write_address_frame() {
        let config = config();
        let frame = CommandCatalog::new(&config).write_address("000000000001").unwrap();
        let parsed = parse_frame(&frame, &config).unwrap();
        assert!(parsed.address().is_broadcast());
        assert_eq!(parsed.control().raw(), 0x15);
        assert_eq!(parsed.data(), &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_energy_clear_defaults_to_zeros() {
        let config = config();
        let frame = CommandCatalog::new(&config).energy_clear(None, Some("  ")).unwrap();
        assert_eq!(frame[8], 0x15);
        assert_eq!(frame[9], 8);
        assert_eq!(&frame[10..18], &[0x33; 8]);
        assert!(checksum_holds(&frame));
    }

    #[test]
    fn test_energy_clear_credentials_low_byte_first() {
        let config = config();
        let request = CommandCatalog::new(&config).energy_clear_request(Some("02123456"), Some("1"));
        assert_eq!(
            request.data(),
            &[0x56, 0x34, 0x12, 0x02, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_power_and_error_calibration_layout() {
        let config = config();
        let params = CalibrationParams {
            credentials: CredentialParams {
                password: Some("02000000".to_string()),
                usercode: None,
            },
            phase: 0x03,
            method: 0x01,
            calibration_type: 0x02,
            voltage: [220.0, 220.0, 220.0],
            current: [5.0, 5.0, 5.0],
            active_power: [1100.0, 1100.0, 1100.0],
            reactive_power: [0.0, 0.0, -1.0],
            error: [-5.4, 0.0, 0.0],
        };
        let request = CommandCatalog::new(&config).power_and_error_calibration_request(&params);
        let data = request.data();

        assert_eq!(request.control().raw(), 0x11);
        assert_eq!(data.len(), 4 + 4 + 4 + 3 + 6 * 3 + 6 * 4 + 3 * 3);
        assert_eq!(&data[0..4], &[0x01, 0xFF, 0x80, 0x02]);
        assert_eq!(&data[4..8], &[0x02, 0x00, 0x00, 0x00]);
        assert_eq!(&data[8..12], &[0x00; 4]);
        assert_eq!(&data[12..15], &[0x03, 0x01, 0x02]);
        // 220 V, high byte first
        assert_eq!(&data[15..18], &[0x00, 0x00, 0xDC]);
        // first active power field, 1100 W
        assert_eq!(&data[33..37], &[0x00, 0x00, 0x04, 0x4C]);
        // last reactive power field, -1
        assert_eq!(&data[53..57], &[0xFF, 0xFF, 0xFF, 0xFF]);
        // first error field, -5
        assert_eq!(&data[57..60], &[0xFF, 0xFF, 0xFB]);

        let frame = request.build(&config).unwrap();
        assert!(checksum_holds(&frame));
        assert_eq!(frame[9] as usize, data.len());
    }

    #[test]
    fn test_time_calibration_layout() {
        let config = config();
        let time = MeterTime::new(2024, 3, 9, 14, 5, 30).unwrap();
        let request = CommandCatalog::new(&config).time_calibration_request_at(time);
        assert_eq!(request.control().raw(), 0x10);
        assert_eq!(request.data(), &[0x02, 0xFF, 0x80, 0x02, 30, 5, 14, 9, 3, 24]);

        let frame = request.build(&config).unwrap();
        let parsed = parse_frame(&frame, &config).unwrap();
        assert_eq!(parsed.data(), request.data());
    }

    #[test]
    fn test_time_calibration_uses_clock() {
        let config = config();
        let frame = CommandCatalog::new(&config).time_calibration().unwrap();
        assert_eq!(frame[9], 10);
        assert!(checksum_holds(&frame));
    }

    #[test]
    fn test_reset_default_layout() {
        let config = config();
        let request = CommandCatalog::new(&config).reset_default_request(None, None);
        assert_eq!(request.control().raw(), 0x11);
        let mut expected = vec![0x00, 0xFF, 0x80, 0x02];
        expected.extend([0x00; 8]);
        expected.push(0x01);
        assert_eq!(request.data(), expected.as_slice());
    }

    #[test]
    fn test_custom_widths() {
        let config = ProtocolConfig {
            address_byte_count: 4,
            password_byte_count: 3,
            usercode_byte_count: 0,
            wake_up_preamble: false,
        };
        let catalog = CommandCatalog::new(&config);
        let frame = catalog.read_address("").unwrap();
        assert_eq!(frame.len(), 4 + 6);
        assert_eq!(catalog.energy_clear_request(None, Some("12")).data().len(), 3);
    }

    #[test]
    fn test_every_command_has_valid_checksum() {
        let config = config();
        let catalog = CommandCatalog::new(&config);
        let frames = vec![
            catalog.read_address("1").unwrap(),
            catalog.write_address("2").unwrap(),
            catalog.energy_clear(Some("3"), Some("4")).unwrap(),
            catalog.power_and_error_calibration(&CalibrationParams::default()).unwrap(),
            catalog.time_calibration().unwrap(),
            catalog.reset_default(None, None).unwrap(),
        ];
        for frame in frames {
            assert!(checksum_holds(&frame));
            assert_eq!(frame[0], 0x68);
            assert_eq!(*frame.last().unwrap(), 0x16);
        }
    }
}
