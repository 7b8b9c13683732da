//! Core types and utilities for the DL/T 645-2007 protocol
//!
//! This crate provides the error type, the numeric codec used to build
//! data fields, the protocol configuration and the meter clock stamp
//! shared by the frame, transport and client crates.

pub mod config;
pub mod error;
pub mod meter_time;
pub mod numeric;

pub use config::{ProtocolConfig, TransportTuning};
pub use error::{Dlt645Error, Dlt645Result};
pub use meter_time::MeterTime;
pub use numeric::{float_to_little_endian, hex_to_little_endian, to_hex_string};
