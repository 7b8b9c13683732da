//! Meter address field

use crate::error::{Dlt645Error, Dlt645Result};
use dlt645_core::numeric::hex_to_little_endian;
use std::fmt;

/// Byte used to fill the broadcast address
pub const BROADCAST_BYTE: u8 = 0xAA;

/// Meter address, stored in display order (as printed on the nameplate)
///
/// The wire representation is the reverse of the display order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeterAddress {
    bytes: Vec<u8>,
}

impl MeterAddress {
    /// Create an address from bytes in display order
    pub fn new(bytes: Vec<u8>) -> Dlt645Result<Self> {
        if bytes.is_empty() {
            return Err(Dlt645Error::InvalidData("Meter address cannot be empty".to_string()));
        }
        Ok(Self { bytes })
    }

    /// The all-`0xAA` address every meter accepts
    pub fn broadcast(width: usize) -> Self {
        Self {
            bytes: vec![BROADCAST_BYTE; width.max(1)],
        }
    }

    /// Parse an operator-entered hex string, padded or cut to `width` bytes
    ///
    /// Returns `None` for blank input.
    pub fn from_hex(hex: &str, width: usize) -> Option<Self> {
        let mut bytes = hex_to_little_endian(hex, Some(width.max(1)));
        if bytes.is_empty() {
            return None;
        }
        bytes.reverse();
        Some(Self { bytes })
    }

    /// Parse a hex string, falling back to the broadcast address on blank input
    pub fn from_hex_or_broadcast(hex: &str, width: usize) -> Self {
        Self::from_hex(hex, width).unwrap_or_else(|| Self::broadcast(width))
    }

    /// Create an address from its wire representation
    pub fn from_wire(wire: &[u8]) -> Dlt645Result<Self> {
        let mut bytes = wire.to_vec();
        bytes.reverse();
        Self::new(bytes)
    }

    /// Bytes in transmission order
    pub fn to_wire(&self) -> Vec<u8> {
        self.bytes.iter().rev().copied().collect()
    }

    /// Bytes in display order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_broadcast(&self) -> bool {
        self.bytes.iter().all(|&b| b == BROADCAST_BYTE)
    }
}

impl fmt::Display for MeterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
