//! Stream accessor trait and the bounded request/response exchange

use crate::error::{Dlt645Error, Dlt645Result};
use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;

const READ_CHUNK: usize = 256;

/// Stream accessor interface to access a physical stream to a remote meter
#[async_trait]
pub trait StreamAccessor: Send {
    /// Read data from the stream
    ///
    /// # Returns
    ///
    /// Number of bytes read, or 0 if EOF
    async fn read(&mut self, buf: &mut [u8]) -> Dlt645Result<usize>;

    /// Write data to the stream
    ///
    /// # Returns
    ///
    /// Number of bytes written
    async fn write(&mut self, buf: &[u8]) -> Dlt645Result<usize>;

    /// Write all data to the stream
    async fn write_all(&mut self, buf: &[u8]) -> Dlt645Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..]).await?;
            if n == 0 {
                return Err(Dlt645Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "Failed to write all data",
                )));
            }
            written += n;
        }
        Ok(())
    }

    /// Flush any buffered data
    async fn flush(&mut self) -> Dlt645Result<()>;

    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream
    async fn close(&mut self) -> Dlt645Result<()>;
}

/// Send one frame and collect the reply
///
/// See [`read_reply`] for how the reply is collected.
///
/// # Returns
///
/// The raw reply, or an empty vector if nothing arrived in time. I/O
/// failures are returned as errors.
pub async fn request_response<S: StreamAccessor + ?Sized>(
    stream: &mut S,
    frame: &[u8],
    max_wait: Duration,
    byte_interval: Duration,
) -> Dlt645Result<Vec<u8>> {
    stream.write_all(frame).await?;
    stream.flush().await?;

    let reply = read_reply(stream, max_wait, byte_interval).await?;
    if reply.is_empty() {
        log::warn!("No reply within {} ms", max_wait.as_millis());
    }
    Ok(reply)
}

/// Collect reply bytes without sending anything
///
/// Waits up to `max_wait` for the first bytes. Once bytes arrive, further
/// chunks are collected until the line stays quiet for `byte_interval`; a
/// zero interval collects only what is already buffered, so a slow reply
/// may come back in several calls.
pub async fn read_reply<S: StreamAccessor + ?Sized>(
    stream: &mut S,
    max_wait: Duration,
    byte_interval: Duration,
) -> Dlt645Result<Vec<u8>> {
    let mut reply = BytesMut::new();
    let mut buf = [0u8; READ_CHUNK];

    match tokio::time::timeout(max_wait, stream.read(&mut buf)).await {
        Err(_) => {
            log::debug!("No reply bytes within {} ms", max_wait.as_millis());
            return Ok(Vec::new());
        }
        Ok(Ok(0)) => {
            log::warn!("Stream reached EOF before a reply arrived");
            return Ok(Vec::new());
        }
        Ok(Ok(n)) => reply.extend_from_slice(&buf[..n]),
        Ok(Err(e)) => return Err(e),
    }

    loop {
        match tokio::time::timeout(byte_interval, stream.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => reply.extend_from_slice(&buf[..n]),
            Ok(Err(e)) => return Err(e),
            _ => break,
        }
    }

    Ok(reply.to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory stream with scripted reply chunks
    #[derive(Debug, Default)]
    pub(crate) struct MockStream {
        pub written: Vec<u8>,
        pub replies: VecDeque<Vec<u8>>,
        pub delay: Option<Duration>,
        pub fail_reads: bool,
        pub closed: bool,
    }

    impl MockStream {
        pub fn with_replies(replies: Vec<Vec<u8>>) -> Self {
            Self {
                replies: replies.into(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl StreamAccessor for MockStream {
        async fn read(&mut self, buf: &mut [u8]) -> Dlt645Result<usize> {
            if self.fail_reads {
                return Err(Dlt645Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "line dropped",
                )));
            }
            if let Some(delay) = self.delay.take() {
                tokio::time::sleep(delay).await;
            }
            match self.replies.pop_front() {
                Some(mut chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.replies.push_front(chunk.split_off(n));
                    }
                    Ok(n)
                }
                // a silent meter never completes the read
                None => std::future::pending().await,
            }
        }

        async fn write(&mut self, buf: &[u8]) -> Dlt645Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Dlt645Result<()> {
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        async fn close(&mut self) -> Dlt645Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reply_collected() {
        let mut stream = MockStream::with_replies(vec![vec![0x68, 0x01], vec![0x02, 0x16]]);
        let reply = request_response(
            &mut stream,
            &[0x68, 0x16],
            Duration::from_millis(200),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(stream.written, vec![0x68, 0x16]);
        assert_eq!(reply, vec![0x68, 0x01, 0x02, 0x16]);
    }

    #[tokio::test]
    async fn test_zero_wait_on_silent_port_returns_immediately() {
        let mut stream = MockStream::default();
        let started = std::time::Instant::now();
        let reply = request_response(&mut stream, &[0x68], Duration::ZERO, Duration::ZERO)
            .await
            .unwrap();
        assert!(reply.is_empty());
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(stream.written, vec![0x68]);
    }

    #[tokio::test]
    async fn test_silent_port_times_out() {
        let mut stream = MockStream::default();
        let reply = request_response(
            &mut stream,
            &[0x68],
            Duration::from_millis(30),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_late_reply_within_window() {
        let mut stream = MockStream::with_replies(vec![vec![0x16]]);
        stream.delay = Some(Duration::from_millis(10));
        let reply = request_response(
            &mut stream,
            &[0x68],
            Duration::from_millis(500),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(reply, vec![0x16]);
    }

    #[tokio::test]
    async fn test_large_chunk_read_in_pieces() {
        let big: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
        let mut stream = MockStream::with_replies(vec![big.clone()]);
        let reply = request_response(
            &mut stream,
            &[0x68],
            Duration::from_millis(100),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(reply, big);
    }

    #[tokio::test]
    async fn test_slow_reply_continues_on_next_read() {
        let mut stream = MockStream::with_replies(vec![vec![0x68; 8], vec![0x16; 10]]);
        let first = request_response(
            &mut stream,
            &[0x68],
            Duration::from_millis(20),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(first.len(), 8);

        stream.delay = Some(Duration::from_millis(5));
        let rest = read_reply(&mut stream, Duration::from_millis(20), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(rest, vec![0x16; 10]);
    }

    #[tokio::test]
    async fn test_read_error_propagated() {
        let mut stream = MockStream::default();
        stream.fail_reads = true;
        let result = request_response(
            &mut stream,
            &[0x68],
            Duration::from_millis(100),
            Duration::ZERO,
        )
        .await;
        assert!(matches!(result, Err(Dlt645Error::Connection(_))));
    }
}
