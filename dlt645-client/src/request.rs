//! A command ready to be framed

use crate::error::{Dlt645Error, Dlt645Result};
use dlt645_core::ProtocolConfig;
use dlt645_frame::{assemble_frame, assemble_frames, ControlCode, MeterAddress};

/// Control code, plain data field and target of one catalog command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    name: &'static str,
    control: ControlCode,
    data: Vec<u8>,
    address: Option<MeterAddress>,
}

impl CommandRequest {
    /// `address` of `None` targets the broadcast address
    pub fn new(
        name: &'static str,
        control: ControlCode,
        data: Vec<u8>,
        address: Option<MeterAddress>,
    ) -> Self {
        Self {
            name,
            control,
            data,
            address,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn control(&self) -> ControlCode {
        self.control
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn address(&self) -> Option<&MeterAddress> {
        self.address.as_ref()
    }

    /// Assemble the first (usually only) frame of this command
    ///
    /// Bytes beyond the per-frame limit are left out, see [`Self::frames`].
    pub fn build(&self, config: &ProtocolConfig) -> Dlt645Result<Vec<u8>> {
        let assembled = assemble_frame(self.control, &self.data, self.address.as_ref(), config)?;
        if assembled.frame.is_empty() {
            log::error!("{}: frame assembly produced no output", self.name);
            return Err(Dlt645Error::EmptyFrame);
        }
        if assembled.has_remainder() {
            log::warn!(
                "{}: {} bytes need a continuation frame",
                self.name,
                assembled.remainder.len()
            );
        }
        Ok(assembled.frame)
    }

    /// Assemble the command into its full chain of continuation frames
    pub fn frames(&self, config: &ProtocolConfig) -> Dlt645Result<Vec<Vec<u8>>> {
        let frames = assemble_frames(self.control, &self.data, self.address.as_ref(), config)?;
        if frames.iter().any(|frame| frame.is_empty()) {
            log::error!("{}: frame assembly produced no output", self.name);
            return Err(Dlt645Error::EmptyFrame);
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt645_frame::FunctionCode;

    #[test]
    fn test_build_and_frames_agree_for_short_payload() {
        let config = ProtocolConfig::default();
        let request = CommandRequest::new(
            "probe",
            ControlCode::command(FunctionCode::ReadData),
            vec![0x00, 0x00, 0x01, 0x00],
            None,
        );
        let frames = request.frames(&config).unwrap();
        assert_eq!(frames, vec![request.build(&config).unwrap()]);
    }

    #[test]
    fn test_long_write_chained() {
        let config = ProtocolConfig::default();
        let request = CommandRequest::new(
            "bulk",
            ControlCode::command(FunctionCode::WriteData),
            vec![0x5A; 101],
            None,
        );
        let first = request.build(&config).unwrap();
        let frames = request.frames(&config).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], first);
    }

    #[test]
    fn test_oversized_read_rejected() {
        let config = ProtocolConfig::default();
        let request = CommandRequest::new(
            "too-long",
            ControlCode::command(FunctionCode::ReadData),
            vec![0; 201],
            None,
        );
        assert!(matches!(request.build(&config), Err(Dlt645Error::InvalidData(_))));
    }
}
