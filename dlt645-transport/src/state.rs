//! Serial transport state machine

use crate::error::{Dlt645Error, Dlt645Result};

/// Serial transport state
///
/// # State Transitions
/// ```text
/// Closed -> Configured (on configure())
/// Configured -> Open (on open())
/// Open -> Closed (on close())
/// Configured -> Closed (on close() or failed configure())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No usable settings and no port handle
    #[default]
    Closed,
    /// Settings parsed, port not yet opened
    Configured,
    /// Port handle held, frames can be exchanged
    Open,
}

impl TransportState {
    pub fn is_open(&self) -> bool {
        matches!(self, TransportState::Open)
    }

    pub fn can_open(&self) -> bool {
        matches!(self, TransportState::Configured | TransportState::Open)
    }

    /// Validate state transition
    pub fn validate_transition(&self, new_state: TransportState) -> Dlt645Result<()> {
        let valid = match (*self, new_state) {
            (TransportState::Closed, TransportState::Configured) => true,
            (TransportState::Configured, TransportState::Configured) => true,
            (TransportState::Configured, TransportState::Open) => true,
            (TransportState::Open, TransportState::Open) => true,
            (_, TransportState::Closed) => true,
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            Err(Dlt645Error::Protocol(format!(
                "Invalid state transition: {:?} -> {:?}",
                self, new_state
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Closed => "Closed",
            TransportState::Configured => "Configured",
            TransportState::Open => "Open",
        }
    }
}
