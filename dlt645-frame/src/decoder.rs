//! Reply decoder
//!
//! Meters answer with a frame that may be preceded by wake-up bytes or line
//! noise and may arrive in several chunks. The decoder buffers raw bytes
//! and yields each complete frame once it is fully received.

use crate::error::{Dlt645Error, Dlt645Result};
use crate::frame::{Dlt645Frame, FRAME_HEAD, FRAME_OVERHEAD};
use bytes::{Buf, BytesMut};

/// Incremental reply decoder
#[derive(Debug)]
pub struct ReplyDecoder {
    buffer: BytesMut,
    address_width: usize,
}

impl ReplyDecoder {
    /// Create a decoder for frames with the given address width
    pub fn new(address_width: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            address_width: address_width.max(1),
        }
    }

    /// Append received bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet consumed
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next frame out of the buffer
    ///
    /// # Returns
    ///
    /// * `None` - no complete frame is buffered yet
    /// * `Some(Ok(frame))` - a valid frame, its bytes are consumed
    /// * `Some(Err(e))` - a candidate frame failed validation; its first byte
    ///   is dropped so the search resumes at the next start character
    pub fn next_frame(&mut self) -> Option<Dlt645Result<Dlt645Frame>> {
        let width = self.address_width;
        loop {
            match self.buffer.iter().position(|&b| b == FRAME_HEAD) {
                Some(pos) => self.buffer.advance(pos),
                None => {
                    self.buffer.clear();
                    return None;
                }
            }

            // need everything up to and including the length byte
            if self.buffer.len() < width + 4 {
                return None;
            }
            if self.buffer[width + 1] != FRAME_HEAD {
                self.buffer.advance(1);
                continue;
            }

            let total = width + FRAME_OVERHEAD + self.buffer[width + 3] as usize;
            if self.buffer.len() < total {
                return None;
            }

            return match Dlt645Frame::decode(&self.buffer[..total], width) {
                Ok(frame) => {
                    self.buffer.advance(total);
                    Some(Ok(frame))
                }
                Err(e) => {
                    log::warn!("Discarding invalid reply candidate: {}", e);
                    self.buffer.advance(1);
                    Some(Err(e))
                }
            };
        }
    }

    /// Decode the first valid frame found in a complete reply buffer
    pub fn decode_reply(reply: &[u8], address_width: usize) -> Dlt645Result<Dlt645Frame> {
        let mut decoder = Self::new(address_width);
        decoder.push(reply);
        let mut last_error = None;
        while let Some(result) = decoder.next_frame() {
            match result {
                Ok(frame) => return Ok(frame),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            Dlt645Error::FrameInvalid("Reply contains no complete frame".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MeterAddress;
    use crate::control::ControlCode;

    fn reply_bytes(data: Vec<u8>) -> Vec<u8> {
        let address = MeterAddress::from_hex("123456789012", 6).unwrap();
        Dlt645Frame::new(address, ControlCode::new(0x93), data).unwrap().encode()
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let bytes = reply_bytes(vec![0x12, 0x34]);
        let mut decoder = ReplyDecoder::new(6);
        decoder.push(&bytes[..5]);
        assert!(decoder.next_frame().is_none());
        decoder.push(&bytes[5..]);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.data(), &[0x12, 0x34]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_noise_and_preamble_skipped() {
        let mut raw = vec![0x00, 0xFE, 0xFE, 0xFE, 0xFE];
        raw.extend(reply_bytes(vec![0x01]));
        let frame = ReplyDecoder::decode_reply(&raw, 6).unwrap();
        assert_eq!(frame.address().to_string(), "123456789012");
    }

    #[test]
    fn test_resyncs_after_corrupt_frame() {
        let mut corrupt = reply_bytes(vec![0x05]);
        let cs = corrupt.len() - 2;
        corrupt[cs] ^= 0xFF;
        let mut raw = corrupt;
        raw.extend(reply_bytes(vec![0x06]));

        let mut decoder = ReplyDecoder::new(6);
        decoder.push(&raw);
        assert!(decoder.next_frame().unwrap().is_err());
        let frame = loop {
            match decoder.next_frame() {
                Some(Ok(frame)) => break frame,
                Some(Err(_)) => continue,
                None => panic!("valid frame not found"),
            }
        };
        assert_eq!(frame.data(), &[0x06]);
    }

    #[test]
    fn test_empty_reply_is_error() {
        assert!(ReplyDecoder::decode_reply(&[], 6).is_err());
        assert!(ReplyDecoder::decode_reply(&[0xFE, 0xFE], 6).is_err());
    }
}
