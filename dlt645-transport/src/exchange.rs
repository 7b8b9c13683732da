//! Frame-level request/response seam used by the client

use crate::error::Dlt645Result;
use crate::serial::SerialTransport;
use async_trait::async_trait;
use std::time::Duration;

/// A link that can send one frame and return the raw reply
#[async_trait]
pub trait FrameExchange: Send {
    /// Send `frame` and wait at most `max_wait`; empty reply on timeout
    async fn exchange(&mut self, frame: &[u8], max_wait: Duration) -> Dlt645Result<Vec<u8>>;

    /// Wait at most `max_wait` for more reply bytes; empty on timeout
    async fn receive(&mut self, max_wait: Duration) -> Dlt645Result<Vec<u8>>;

    /// Default wait window for one exchange
    fn response_time(&self) -> Duration;
}

#[async_trait]
impl FrameExchange for SerialTransport {
    async fn exchange(&mut self, frame: &[u8], max_wait: Duration) -> Dlt645Result<Vec<u8>> {
        self.send_and_receive(frame, max_wait).await
    }

    async fn receive(&mut self, max_wait: Duration) -> Dlt645Result<Vec<u8>> {
        SerialTransport::receive(self, max_wait).await
    }

    fn response_time(&self) -> Duration {
        self.tuning().response_time()
    }
}
