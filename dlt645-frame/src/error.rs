//! Error types shared with the core crate

pub use dlt645_core::error::{Dlt645Error, Dlt645Result};
