//! Serial port transport implementation

use crate::error::{Dlt645Error, Dlt645Result};
use crate::settings::SerialSettings;
use crate::state::TransportState;
use crate::statistics::TransportStatistics;
use crate::stream::{read_reply, request_response, StreamAccessor};
use async_trait::async_trait;
use dlt645_core::TransportTuning;
use dlt645_core::numeric::to_hex_string;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, FlowControl, SerialPort, SerialStream};

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

impl Deref for DebugSerialStream {
    type Target = SerialStream;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DebugSerialStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Host name of the serial port with the given index
///
/// `COM<N>` on Windows, `/dev/ttyUSB<N>` elsewhere.
pub fn port_name_for_index(index: u32) -> String {
    if cfg!(windows) {
        format!("COM{}", index)
    } else {
        format!("/dev/ttyUSB{}", index)
    }
}

/// Serial port transport
///
/// Owns the port handle exclusively. The handle is released by
/// [`StreamAccessor::close`] or when the transport is dropped.
#[derive(Debug, Default)]
pub struct SerialTransport {
    stream: Option<DebugSerialStream>,
    settings: Option<SerialSettings>,
    port_name: Option<String>,
    state: TransportState,
    tuning: TransportTuning,
    statistics: TransportStatistics,
}

impl SerialTransport {
    /// Create a closed transport with the given link timing
    pub fn new(tuning: TransportTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    /// Parse and store line settings
    ///
    /// A malformed string leaves the transport closed. Reconfiguring an open
    /// port is refused.
    pub fn configure(&mut self, settings: &str) -> Dlt645Result<()> {
        if self.state.is_open() {
            return Err(Dlt645Error::Protocol(
                "Cannot reconfigure an open port, close it first".to_string(),
            ));
        }

        match SerialSettings::parse(settings) {
            Ok(parsed) => {
                self.state.validate_transition(TransportState::Configured)?;
                log::info!("Serial transport configured: {}", parsed);
                self.settings = Some(parsed);
                self.state = TransportState::Configured;
                Ok(())
            }
            Err(e) => {
                log::error!("Serial configuration rejected: {}", e);
                self.settings = None;
                self.state = TransportState::Closed;
                Err(e)
            }
        }
    }

    /// Open the port with the given index, see [`port_name_for_index`]
    pub async fn open(&mut self, port_index: u32) -> Dlt645Result<()> {
        self.open_named(&port_name_for_index(port_index)).await
    }

    /// Open the port by its host name
    ///
    /// Opening an already open port is a no-op. On failure the transport
    /// stays configured.
    pub async fn open_named(&mut self, port_name: &str) -> Dlt645Result<()> {
        if self.state.is_open() {
            log::debug!("Serial port {} already open", port_name);
            return Ok(());
        }

        let settings = match (self.state.can_open(), self.settings) {
            (true, Some(settings)) => settings,
            _ => {
                return Err(Dlt645Error::Configuration(
                    "Serial transport must be configured before opening".to_string(),
                ));
            }
        };

        let builder = tokio_serial::new(port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity.to_serial()?)
            .flow_control(FlowControl::None);

        let mut stream = SerialStream::open(&builder).map_err(|e| map_open_error(port_name, e))?;

        stream.write_data_terminal_ready(true).map_err(|e| {
            Dlt645Error::Connection(std::io::Error::other(format!(
                "Failed to enable DTR on {}: {}",
                port_name, e
            )))
        })?;

        log::info!("Opened serial port {} ({})", port_name, settings);
        self.stream = Some(DebugSerialStream(stream));
        self.port_name = Some(port_name.to_string());
        self.state = TransportState::Open;
        Ok(())
    }

    /// Send a frame and wait at most `max_wait` for the reply
    ///
    /// # Returns
    ///
    /// The raw reply, empty when the meter did not answer in time.
    pub async fn send_and_receive(&mut self, frame: &[u8], max_wait: Duration) -> Dlt645Result<Vec<u8>> {
        if !self.state.is_open() {
            return Err(Dlt645Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial port not open",
            )));
        }

        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.clear(ClearBuffer::Input) {
                log::debug!("Could not discard stale input: {}", e);
            }
        }

        log::debug!("TX {}", to_hex_string(frame));
        let byte_interval = self.tuning.byte_interval();
        let result = request_response(self, frame, max_wait, byte_interval).await;

        match &result {
            Ok(reply) => {
                self.statistics.record_sent(frame.len());
                self.statistics.record_reply(reply.len());
                if !reply.is_empty() {
                    log::debug!("RX {}", to_hex_string(reply));
                }
            }
            Err(e) => {
                self.statistics.record_io_error();
                log::error!("Serial exchange failed: {}", e);
            }
        }
        result
    }

    /// Send a frame using the configured response time as the wait window
    pub async fn send(&mut self, frame: &[u8]) -> Dlt645Result<Vec<u8>> {
        let max_wait = self.tuning.response_time();
        self.send_and_receive(frame, max_wait).await
    }

    /// Wait at most `max_wait` for further reply bytes without sending
    ///
    /// Used to complete a reply whose first bytes came back from
    /// [`send_and_receive`](Self::send_and_receive). Empty on timeout.
    pub async fn receive(&mut self, max_wait: Duration) -> Dlt645Result<Vec<u8>> {
        if !self.state.is_open() {
            return Err(not_connected());
        }

        let byte_interval = self.tuning.byte_interval();
        match read_reply(self, max_wait, byte_interval).await {
            Ok(chunk) => {
                if !chunk.is_empty() {
                    log::debug!("RX {}", to_hex_string(&chunk));
                }
                Ok(chunk)
            }
            Err(e) => {
                self.statistics.record_io_error();
                log::error!("Serial receive failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn settings(&self) -> Option<&SerialSettings> {
        self.settings.as_ref()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn tuning(&self) -> TransportTuning {
        self.tuning
    }

    pub fn tuning_mut(&mut self) -> &mut TransportTuning {
        &mut self.tuning
    }

    pub fn statistics(&self) -> &TransportStatistics {
        &self.statistics
    }
}

fn map_open_error(port_name: &str, e: tokio_serial::Error) -> Dlt645Error {
    match e.kind() {
        tokio_serial::ErrorKind::NoDevice
        | tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            log::warn!("Serial port {} is busy or unavailable: {}", port_name, e);
            Dlt645Error::PortBusy(format!("{}: {}", port_name, e))
        }
        _ => {
            log::error!("Failed to open serial port {}: {}", port_name, e);
            Dlt645Error::Connection(std::io::Error::other(format!(
                "Failed to open serial port {}: {}",
                port_name, e
            )))
        }
    }
}

fn not_connected() -> Dlt645Error {
    Dlt645Error::Connection(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "Serial stream not connected",
    ))
}

#[async_trait]
impl StreamAccessor for SerialTransport {
    async fn read(&mut self, buf: &mut [u8]) -> Dlt645Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.read(buf).await.map_err(Dlt645Error::Connection)
    }

    async fn write(&mut self, buf: &[u8]) -> Dlt645Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.write(buf).await.map_err(Dlt645Error::Connection)
    }

    async fn flush(&mut self) -> Dlt645Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.flush().await.map_err(Dlt645Error::Connection)
    }

    fn is_closed(&self) -> bool {
        !self.state.is_open()
    }

    /// Release the port and forget the line settings; idempotent
    async fn close(&mut self) -> Dlt645Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.flush().await {
                log::debug!("Could not flush pending output on close: {}", e);
            }
            if let Some(name) = &self.port_name {
                log::info!("Closed serial port {}", name);
            }
        }
        self.port_name = None;
        self.settings = None;
        self.state = TransportState::Closed;
        Ok(())
    }
}
