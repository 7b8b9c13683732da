//! DL/T 645 frame structure and encoding/decoding

use crate::address::MeterAddress;
use crate::checksum::SumCheck;
use crate::cipher;
use crate::control::ControlCode;
use crate::error::{Dlt645Error, Dlt645Result};
use dlt645_core::ProtocolConfig;
use dlt645_core::numeric::to_hex_string;
use std::fmt;

/// Start character, sent before and after the address
pub const FRAME_HEAD: u8 = 0x68;

/// End character
pub const FRAME_TAIL: u8 = 0x16;

/// Bytes sent ahead of a frame to wake the meter's receiver
pub const WAKE_UP_PREAMBLE: [u8; 4] = [0xFE; 4];

/// Data field limit for read-class control codes
pub const MAX_READ_DATA_LENGTH: usize = 200;

/// Data field limit for write-class control codes
pub const MAX_WRITE_DATA_LENGTH: usize = 50;

// head, head2, control, length, checksum, tail
pub(crate) const FRAME_OVERHEAD: usize = 6;

/// Output of [`assemble_frame`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFrame {
    /// Complete frame ready for transmission
    pub frame: Vec<u8>,
    /// Payload bytes that did not fit and belong in a continuation frame
    pub remainder: Vec<u8>,
    /// Control code actually written into the frame
    pub control: ControlCode,
}

impl AssembledFrame {
    pub fn has_remainder(&self) -> bool {
        !self.remainder.is_empty()
    }
}

/// Decide the final control code and split the payload at the per-frame limit
///
/// A write-class payload longer than 50 bytes is cut to 50, the control
/// code gets its follow-up bit and the excess is returned as the
/// remainder. Read-class payloads are never cut; one above 200 bytes is
/// rejected.
///
/// # Returns
///
/// `(control, payload, remainder)` where `payload.len()` is the value of
/// the length field.
pub fn derive_length(
    control: ControlCode,
    data: &[u8],
) -> Dlt645Result<(ControlCode, &[u8], &[u8])> {
    let max_length = control.max_data_length();

    if data.len() <= max_length {
        return Ok((control, data, &data[data.len()..]));
    }

    if control.is_write_class() {
        let (payload, remainder) = data.split_at(max_length);
        log::debug!(
            "Write payload of {} bytes split, {} bytes left for continuation",
            data.len(),
            remainder.len()
        );
        Ok((control.with_follow_up(), payload, remainder))
    } else {
        Err(Dlt645Error::InvalidData(format!(
            "Read payload of {} bytes exceeds {} bytes",
            data.len(),
            max_length
        )))
    }
}

/// Build a command frame
///
/// # Arguments
///
/// * `control` - Control code before the follow-up bit is derived
/// * `data` - Plain data field, already in transmission order
/// * `address` - Target meter; `None` uses the broadcast address of the
///   configured width
/// * `config` - Protocol configuration
pub fn assemble_frame(
    control: ControlCode,
    data: &[u8],
    address: Option<&MeterAddress>,
    config: &ProtocolConfig,
) -> Dlt645Result<AssembledFrame> {
    let address = match address {
        Some(address) => address.clone(),
        None => MeterAddress::broadcast(config.address_byte_count),
    };

    let (control, payload, remainder) = derive_length(control, data)?;
    let frame = Dlt645Frame::new(address, control, payload.to_vec())?.encode();

    Ok(AssembledFrame {
        frame,
        remainder: remainder.to_vec(),
        control,
    })
}

/// Parse a complete frame using the configured address width
pub fn parse_frame(bytes: &[u8], config: &ProtocolConfig) -> Dlt645Result<Dlt645Frame> {
    Dlt645Frame::decode(bytes, config.address_byte_count)
}

/// A DL/T 645 frame with its data field in plain (deciphered) form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dlt645Frame {
    address: MeterAddress,
    control: ControlCode,
    data: Vec<u8>,
}

impl Dlt645Frame {
    /// Create a new frame
    ///
    /// Fails when the data field cannot be described by the one-byte length.
    pub fn new(address: MeterAddress, control: ControlCode, data: Vec<u8>) -> Dlt645Result<Self> {
        if data.len() > u8::MAX as usize {
            return Err(Dlt645Error::InvalidData(format!(
                "Data field of {} bytes does not fit the length byte",
                data.len()
            )));
        }
        Ok(Self {
            address,
            control,
            data,
        })
    }

    /// Encode frame to bytes, checksum and tail included
    pub fn encode(&self) -> Vec<u8> {
        let mut result =
            Vec::with_capacity(self.address.byte_length() + self.data.len() + FRAME_OVERHEAD);

        result.push(FRAME_HEAD);
        result.extend_from_slice(&self.address.to_wire());
        result.push(FRAME_HEAD);
        result.push(self.control.raw());
        result.push(self.data.len() as u8);
        result.extend_from_slice(&cipher::encode(&self.data));

        let checksum = SumCheck::of(&result);
        result.push(checksum);
        result.push(FRAME_TAIL);
        result
    }

    /// Decode a frame from bytes
    ///
    /// Leading wake-up bytes (`0xFE`) are skipped. The rest must be exactly
    /// one frame.
    pub fn decode(frame: &[u8], address_width: usize) -> Dlt645Result<Self> {
        let start = frame.iter().take_while(|&&b| b == WAKE_UP_PREAMBLE[0]).count();
        let frame = &frame[start..];

        if address_width == 0 {
            return Err(Dlt645Error::InvalidData("Address width must be non-zero".to_string()));
        }
        if frame.len() < address_width + FRAME_OVERHEAD {
            return Err(Dlt645Error::FrameInvalid("Frame too short".to_string()));
        }

        if frame[0] != FRAME_HEAD {
            return Err(Dlt645Error::FrameInvalid(format!(
                "Expected start character 0x68, but received: 0x{:02X}",
                frame[0]
            )));
        }
        let head2_pos = 1 + address_width;
        if frame[head2_pos] != FRAME_HEAD {
            return Err(Dlt645Error::FrameInvalid(format!(
                "Expected second start character 0x68, but received: 0x{:02X}",
                frame[head2_pos]
            )));
        }

        let control = ControlCode::new(frame[head2_pos + 1]);
        let length = frame[head2_pos + 2] as usize;
        let data_pos = head2_pos + 3;
        let checksum_pos = data_pos + length;

        if frame.len() != checksum_pos + 2 {
            return Err(Dlt645Error::FrameInvalid(format!(
                "Length field says {} data bytes, frame carries {}",
                length,
                frame.len().saturating_sub(data_pos + 2)
            )));
        }
        if frame[checksum_pos + 1] != FRAME_TAIL {
            return Err(Dlt645Error::FrameInvalid(format!(
                "Expected end character 0x16, but received: 0x{:02X}",
                frame[checksum_pos + 1]
            )));
        }

        let mut sum = SumCheck::new();
        sum.update_bytes(&frame[..checksum_pos]);
        sum.validate(frame[checksum_pos])?;

        let address = MeterAddress::from_wire(&frame[1..head2_pos])?;
        let data = cipher::decode(&frame[data_pos..checksum_pos]);

        Ok(Self {
            address,
            control,
            data,
        })
    }

    pub fn address(&self) -> &MeterAddress {
        &self.address
    }

    pub fn control(&self) -> ControlCode {
        self.control
    }

    /// Plain data field
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Display for Dlt645Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DL/T 645 Frame: addr={}, control={}, data=[{}]",
            self.address,
            self.control,
            to_hex_string(&self.data)
        )
    }
}
