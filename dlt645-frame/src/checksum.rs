//! Modulo-256 sum check

use crate::error::{Dlt645Error, Dlt645Result};

/// Running modulo-256 sum over the frame bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumCheck {
    value: u8,
}

impl SumCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    pub fn update(&mut self, byte: u8) {
        self.value = self.value.wrapping_add(byte);
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Compare the running sum against the checksum byte of a frame
    pub fn validate(&self, received: u8) -> Dlt645Result<()> {
        if self.value != received {
            Err(Dlt645Error::ChecksumMismatch {
                expected: self.value,
                actual: received,
            })
        } else {
            Ok(())
        }
    }

    /// Sum of a complete byte slice
    pub fn of(bytes: &[u8]) -> u8 {
        let mut sum = Self::new();
        sum.update_bytes(bytes);
        sum.value()
    }
}
