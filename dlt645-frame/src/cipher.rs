//! Data field offset cipher
//!
//! Every data byte is transmitted as `byte + 0x33` (mod 256) and restored
//! with `byte - 0x33` on reception.

/// Offset added to every data byte on the wire
pub const DATA_OFFSET: u8 = 0x33;

/// Apply the offset in place
pub fn encode_in_place(data: &mut [u8]) {
    for byte in data.iter_mut() {
        *byte = byte.wrapping_add(DATA_OFFSET);
    }
}

/// Remove the offset in place
pub fn decode_in_place(data: &mut [u8]) {
    for byte in data.iter_mut() {
        *byte = byte.wrapping_sub(DATA_OFFSET);
    }
}

pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    encode_in_place(&mut out);
    out
}

pub fn decode(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    decode_in_place(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wraps() {
        assert_eq!(encode(&[0x00, 0xCC, 0xCD, 0xFF]), vec![0x33, 0xFF, 0x00, 0x32]);
    }

    #[test]
    fn test_decode_inverts_encode_for_every_byte() {
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&all)), all);
    }
}
