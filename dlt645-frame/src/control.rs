//! Control code (C field) of a DL/T 645 frame
//!
//! ```text
//! D7   direction      0 = master command, 1 = slave reply
//! D6   reply flag     0 = normal reply,   1 = abnormal reply
//! D5   follow-up      0 = last frame,     1 = continuation follows
//! D4-0 function code
//! ```

use std::fmt;

const DIRECTION_BIT: u8 = 0x80;
const ERROR_BIT: u8 = 0x40;
const FOLLOW_UP_BIT: u8 = 0x20;
const FUNCTION_MASK: u8 = 0x1F;

/// Function code carried in bits 4-0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    Reserved,
    /// Standard broadcast timing (01000)
    BroadcastTiming,
    /// Broadcast time sync used by the calibration command (10000)
    BroadcastTimeSync,
    ReadData,
    ReadFollowUpData,
    ReadAddress,
    WriteData,
    /// Write address, also used for clearing and calibrate-by-write (10101)
    WriteAddress,
    Freeze,
    ChangeBaudRate,
    ChangePassword,
    MaxDemandClear,
    MeterClear,
    EventClear,
    Other(u8),
}

impl FunctionCode {
    /// Get function code from the low five bits of a control byte
    pub fn from_bits(bits: u8) -> Self {
        match bits & FUNCTION_MASK {
            0b00000 => FunctionCode::Reserved,
            0b01000 => FunctionCode::BroadcastTiming,
            0b10000 => FunctionCode::BroadcastTimeSync,
            0b10001 => FunctionCode::ReadData,
            0b10010 => FunctionCode::ReadFollowUpData,
            0b10011 => FunctionCode::ReadAddress,
            0b10100 => FunctionCode::WriteData,
            0b10101 => FunctionCode::WriteAddress,
            0b10110 => FunctionCode::Freeze,
            0b10111 => FunctionCode::ChangeBaudRate,
            0b11000 => FunctionCode::ChangePassword,
            0b11001 => FunctionCode::MaxDemandClear,
            0b11010 => FunctionCode::MeterClear,
            0b11011 => FunctionCode::EventClear,
            other => FunctionCode::Other(other),
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            FunctionCode::Reserved => 0b00000,
            FunctionCode::BroadcastTiming => 0b01000,
            FunctionCode::BroadcastTimeSync => 0b10000,
            FunctionCode::ReadData => 0b10001,
            FunctionCode::ReadFollowUpData => 0b10010,
            FunctionCode::ReadAddress => 0b10011,
            FunctionCode::WriteData => 0b10100,
            FunctionCode::WriteAddress => 0b10101,
            FunctionCode::Freeze => 0b10110,
            FunctionCode::ChangeBaudRate => 0b10111,
            FunctionCode::ChangePassword => 0b11000,
            FunctionCode::MaxDemandClear => 0b11001,
            FunctionCode::MeterClear => 0b11010,
            FunctionCode::EventClear => 0b11011,
            FunctionCode::Other(bits) => bits & FUNCTION_MASK,
        }
    }
}

/// Bit-packed control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlCode(u8);

impl ControlCode {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Master command with the given function and no flags set
    pub fn command(function: FunctionCode) -> Self {
        Self(function.bits())
    }

    pub fn raw(&self) -> u8 {
        self.0
    }

    pub fn is_response(&self) -> bool {
        self.0 & DIRECTION_BIT != 0
    }

    /// Abnormal reply flag, only meaningful on replies
    pub fn is_error(&self) -> bool {
        self.is_response() && self.0 & ERROR_BIT != 0
    }

    pub fn has_follow_up(&self) -> bool {
        self.0 & FOLLOW_UP_BIT != 0
    }

    pub fn with_follow_up(self) -> Self {
        Self(self.0 | FOLLOW_UP_BIT)
    }

    pub fn without_follow_up(self) -> Self {
        Self(self.0 & !FOLLOW_UP_BIT)
    }

    pub fn function_code(&self) -> FunctionCode {
        FunctionCode::from_bits(self.0)
    }

    /// Write-class codes have both D2 and D4 set
    pub fn is_write_class(&self) -> bool {
        (self.0 >> 2) & 1 == 1 && (self.0 >> 4) & 1 == 1
    }

    /// Largest data field a single frame may carry for this code
    pub fn max_data_length(&self) -> usize {
        if self.is_write_class() {
            crate::frame::MAX_WRITE_DATA_LENGTH
        } else {
            crate::frame::MAX_READ_DATA_LENGTH
        }
    }
}

impl From<u8> for ControlCode {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<ControlCode> for u8 {
    fn from(code: ControlCode) -> Self {
        code.0
    }
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02X} ({:?}, {}{}{})",
            self.0,
            self.function_code(),
            if self.is_response() { "reply" } else { "command" },
            if self.is_error() { ", error" } else { "" },
            if self.has_follow_up() { ", follow-up" } else { "" },
        )
    }
}
