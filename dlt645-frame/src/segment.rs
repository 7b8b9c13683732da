//! Continuation frame chaining for oversized write payloads

use crate::address::MeterAddress;
use crate::control::ControlCode;
use crate::error::Dlt645Result;
use crate::frame::assemble_frame;
use dlt645_core::ProtocolConfig;

/// Assemble a payload into as many frames as the per-frame limit requires
///
/// Each frame except the last carries the follow-up bit. Payloads that fit
/// in one frame, including empty ones, produce exactly one frame.
pub fn assemble_frames(
    control: ControlCode,
    data: &[u8],
    address: Option<&MeterAddress>,
    config: &ProtocolConfig,
) -> Dlt645Result<Vec<Vec<u8>>> {
    let mut frames = Vec::new();
    let mut pending = data.to_vec();

    loop {
        let assembled = assemble_frame(control, &pending, address, config)?;
        frames.push(assembled.frame);
        if assembled.remainder.is_empty() {
            break;
        }
        pending = assembled.remainder;
    }

    if frames.len() > 1 {
        log::debug!("Payload of {} bytes chained into {} frames", data.len(), frames.len());
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::FunctionCode;
    use crate::frame::{parse_frame, MAX_WRITE_DATA_LENGTH};

    #[test]
    fn test_single_frame() {
        let config = ProtocolConfig::default();
        let frames = assemble_frames(
            ControlCode::command(FunctionCode::WriteData),
            &[0x01; 10],
            None,
            &config,
        )
        .unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_chain_reassembles_payload() {
        let config = ProtocolConfig::default();
        let data: Vec<u8> = (0..=120).collect();
        let frames = assemble_frames(
            ControlCode::command(FunctionCode::WriteData),
            &data,
            None,
            &config,
        )
        .unwrap();
        assert_eq!(frames.len(), 3);

        let mut payload = Vec::new();
        for (i, bytes) in frames.iter().enumerate() {
            let frame = parse_frame(bytes, &config).unwrap();
            let last = i == frames.len() - 1;
            assert_eq!(frame.control().has_follow_up(), !last);
            assert!(frame.data().len() <= MAX_WRITE_DATA_LENGTH);
            payload.extend_from_slice(frame.data());
        }
        assert_eq!(payload, data);
    }
}
