use thiserror::Error;

/// Main error type for DL/T 645 operations
#[derive(Error, Debug)]
pub enum Dlt645Error {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A reply started but did not complete within the response time.
    /// Silence is not an error and comes back as an empty reply.
    #[error("Timeout")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Frame invalid: {0}")]
    FrameInvalid(String),

    #[error("Checksum mismatch: expected 0x{expected:02X}, found 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serial port busy: {0}")]
    PortBusy(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Frame assembly produced no output")]
    EmptyFrame,
}

impl Dlt645Error {
    /// Whether the caller may reasonably retry the operation
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Dlt645Error::EmptyFrame)
    }
}

/// Result type alias for DL/T 645 operations
pub type Dlt645Result<T> = Result<T, Dlt645Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_message() {
        let err = Dlt645Error::ChecksumMismatch { expected: 0x1A, actual: 0x02 };
        assert_eq!(err.to_string(), "Checksum mismatch: expected 0x1A, found 0x02");
    }

    #[test]
    fn test_empty_frame_is_fatal() {
        assert!(!Dlt645Error::EmptyFrame.is_recoverable());
        assert!(Dlt645Error::Timeout.is_recoverable());
        assert!(Dlt645Error::PortBusy("COM3".to_string()).is_recoverable());
    }
}
