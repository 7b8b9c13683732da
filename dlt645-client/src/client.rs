//! Meter client
//!
//! Sends catalog commands over a [`FrameExchange`] link, chaining
//! continuation frames and decoding the meter's replies.

use crate::commands::CommandCatalog;
use crate::error::{Dlt645Error, Dlt645Result};
use crate::request::CommandRequest;
use dlt645_core::ProtocolConfig;
use dlt645_core::numeric::to_hex_string;
use dlt645_frame::{Dlt645Frame, MeterAddress, ReplyDecoder, WAKE_UP_PREAMBLE};
use dlt645_transport::FrameExchange;
use tokio::time::Instant;

/// Human readable meaning of an abnormal reply's error byte
pub fn describe_error_code(code: u8) -> String {
    const BITS: [&str; 7] = [
        "other error",
        "no requested data",
        "password error or unauthorized",
        "baud rate cannot be changed",
        "annual time zone count exceeded",
        "daily time slot count exceeded",
        "tariff count exceeded",
    ];
    let reasons: Vec<&str> = BITS
        .iter()
        .enumerate()
        .filter(|(bit, _)| code & (1 << bit) != 0)
        .map(|(_, reason)| *reason)
        .collect();
    if reasons.is_empty() {
        format!("unspecified error 0x{:02X}", code)
    } else {
        reasons.join(", ")
    }
}

/// Whether `frame` is the meter's reply to `request`
fn answers(request: &CommandRequest, frame: &Dlt645Frame) -> bool {
    frame.control().is_response()
        && frame.control().function_code() == request.control().function_code()
}

/// DL/T 645 client bound to one link and one protocol configuration
#[derive(Debug)]
pub struct MeterClient<L: FrameExchange> {
    link: L,
    config: ProtocolConfig,
}

impl<L: FrameExchange> MeterClient<L> {
    pub fn new(link: L, config: ProtocolConfig) -> Self {
        Self { link, config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn catalog(&self) -> CommandCatalog<'_> {
        CommandCatalog::new(&self.config)
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    /// Send a raw frame and return the raw reply; empty on timeout
    pub async fn send_raw(&mut self, frame: &[u8]) -> Dlt645Result<Vec<u8>> {
        let mut wire = Vec::with_capacity(frame.len() + WAKE_UP_PREAMBLE.len());
        if self.config.wake_up_preamble {
            wire.extend_from_slice(&WAKE_UP_PREAMBLE);
        }
        wire.extend_from_slice(frame);

        let max_wait = self.link.response_time();
        self.link.exchange(&wire, max_wait).await
    }

    /// Execute a command, sending every continuation frame in order
    ///
    /// Stops at the first frame the meter does not answer.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(frame))` - the reply to the last frame
    /// * `Ok(None)` - the meter stayed silent
    /// * `Err(Protocol)` - the meter sent an abnormal reply
    pub async fn execute(&mut self, request: &CommandRequest) -> Dlt645Result<Option<Dlt645Frame>> {
        let frames = request.frames(&self.config)?;
        let count = frames.len();
        let mut last_reply = None;

        for (index, frame) in frames.iter().enumerate() {
            log::debug!(
                "{} frame {}/{}: {}",
                request.name(),
                index + 1,
                count,
                to_hex_string(frame)
            );

            let raw = self.send_raw(frame).await?;
            let reply = match self.collect_reply(request, raw).await? {
                Some(reply) => reply,
                None => {
                    log::warn!("{}: no reply to frame {}/{}", request.name(), index + 1, count);
                    return Ok(None);
                }
            };

            if reply.control().is_error() {
                let code = reply.data().first().copied().unwrap_or(0);
                return Err(Dlt645Error::Protocol(format!(
                    "{} rejected by meter {}: {}",
                    request.name(),
                    reply.address(),
                    describe_error_code(code)
                )));
            }
            log::info!("{}: {}", request.name(), reply);
            last_reply = Some(reply);
        }

        Ok(last_reply)
    }

    /// Read until a frame answering `request` is complete or the response
    /// time runs out
    ///
    /// Echoes of outgoing commands and replies to other functions are
    /// skipped. A reply left incomplete at the deadline is a `Timeout`.
    async fn collect_reply(
        &mut self,
        request: &CommandRequest,
        first: Vec<u8>,
    ) -> Dlt645Result<Option<Dlt645Frame>> {
        let deadline = Instant::now() + self.link.response_time();
        let mut decoder = ReplyDecoder::new(self.config.address_byte_count);
        let mut last_error = None;
        let mut chunk = first;

        while !chunk.is_empty() {
            decoder.push(&chunk);
            while let Some(result) = decoder.next_frame() {
                match result {
                    Ok(frame) if answers(request, &frame) => return Ok(Some(frame)),
                    Ok(frame) => log::debug!("{}: ignoring frame {}", request.name(), frame),
                    Err(e) => last_error = Some(e),
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            chunk = self.link.receive(remaining).await?;
        }

        if let Some(e) = last_error {
            return Err(e);
        }
        if decoder.pending() > 0 {
            log::warn!(
                "{}: reply incomplete, {} bytes buffered",
                request.name(),
                decoder.pending()
            );
            return Err(Dlt645Error::Timeout);
        }
        Ok(None)
    }

    /// Read the meter's communication address
    pub async fn read_address(&mut self, address: &str) -> Dlt645Result<Option<MeterAddress>> {
        let request = self.catalog().read_address_request(address);
        let reply = self.execute(&request).await?;
        Ok(reply.map(|frame| frame.address().clone()))
    }
}
