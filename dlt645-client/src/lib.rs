//! Client module for the DL/T 645-2007 protocol
//!
//! This crate builds the tool's command frames and drives a meter over a
//! [`FrameExchange`](dlt645_transport::FrameExchange) link.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use dlt645_client::{CommandCatalog, MeterClient};
//! use dlt645_core::{ProtocolConfig, TransportTuning};
//! use dlt645_transport::SerialTransport;
//!
//! # async fn run() -> dlt645_core::Dlt645Result<()> {
//! let config = ProtocolConfig::default();
//! let frame = CommandCatalog::new(&config).read_address("")?;
//!
//! let mut transport = SerialTransport::new(TransportTuning::default());
//! transport.configure("2400,8,E,1")?;
//! transport.open(1).await?;
//! let mut client = MeterClient::new(transport, config);
//! let address = client.read_address("").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod params;
pub mod request;

pub use client::{describe_error_code, MeterClient};
pub use commands::CommandCatalog;
pub use error::{Dlt645Error, Dlt645Result};
pub use params::{CalibrationParams, CredentialParams, MeterCommand, ToolSettings};
pub use request::CommandRequest;
