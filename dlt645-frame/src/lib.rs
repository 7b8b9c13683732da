//! Frame layer module for the DL/T 645-2007 protocol
//!
//! This crate assembles outbound command frames and parses meter replies:
//!
//! ```text
//! 68 | A0 .. An | 68 | C | L | DATA (+0x33) | CS | 16
//! ```
//!
//! The address travels low byte first, the data field carries the 0x33
//! offset, and CS is the modulo-256 sum of everything from the first `68`
//! through the last data byte.

pub mod address;
pub mod checksum;
pub mod cipher;
pub mod control;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod segment;

pub use address::MeterAddress;
pub use checksum::SumCheck;
pub use control::{ControlCode, FunctionCode};
pub use decoder::ReplyDecoder;
pub use error::{Dlt645Error, Dlt645Result};
pub use frame::{
    assemble_frame, derive_length, parse_frame, AssembledFrame, Dlt645Frame, FRAME_HEAD,
    FRAME_TAIL, MAX_READ_DATA_LENGTH, MAX_WRITE_DATA_LENGTH, WAKE_UP_PREAMBLE,
};
pub use segment::assemble_frames;
