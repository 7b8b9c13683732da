//! Transport layer module for the DL/T 645-2007 protocol
//!
//! This crate owns the serial link to the meter: settings parsing, the
//! open/close life cycle and the bounded request/response exchange.

pub mod error;
pub mod exchange;
pub mod serial;
pub mod settings;
pub mod state;
pub mod statistics;
pub mod stream;

pub use error::{Dlt645Error, Dlt645Result};
pub use exchange::FrameExchange;
pub use serial::{port_name_for_index, SerialTransport};
pub use settings::{ParitySetting, SerialSettings};
pub use state::TransportState;
pub use statistics::TransportStatistics;
pub use stream::{read_reply, request_response, StreamAccessor};
