//! dlt645 - Rust implementation of the DL/T 645-2007 meter protocol
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `dlt645-core`: error type, numeric codec, configuration, meter time
//! - `dlt645-frame`: control code, cipher, checksum, frame assembly and parsing
//! - `dlt645-transport`: serial settings, serial port transport, request/response exchange
//! - `dlt645-client`: command catalog, tool settings, meter client
//!
//! # Usage
//!
//! ```no_run
//! use dlt645::client::CommandCatalog;
//! use dlt645::{to_hex_string, ProtocolConfig};
//!
//! let config = ProtocolConfig::default();
//! let frame = CommandCatalog::new(&config).read_address("123456789012").unwrap();
//! println!("{}", to_hex_string(&frame));
//! ```

// Re-export core types
pub use dlt645_core::{
    float_to_little_endian, hex_to_little_endian, to_hex_string, Dlt645Error, Dlt645Result,
    MeterTime, ProtocolConfig, TransportTuning,
};

// Re-export frame layer
pub mod frame {
    pub use dlt645_frame::*;
}

// Re-export transport layer
pub mod transport {
    pub use dlt645_transport::*;
}

// Re-export client API
pub mod client {
    pub use dlt645_client::*;
}
