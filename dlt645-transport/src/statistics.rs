//! Transport statistics collection

/// Counters kept per transport instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStatistics {
    /// Frames written to the port
    pub frames_sent: u64,
    /// Exchanges that produced a non-empty reply
    pub replies_received: u64,
    /// Exchanges that ended without reply
    pub timeouts: u64,
    /// Read or write failures
    pub io_errors: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl TransportStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn record_sent(&mut self, bytes: usize) {
        self.frames_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub fn record_reply(&mut self, bytes: usize) {
        if bytes == 0 {
            self.timeouts += 1;
        } else {
            self.replies_received += 1;
            self.bytes_received += bytes as u64;
        }
    }

    pub fn record_io_error(&mut self) {
        self.io_errors += 1;
    }

    /// Share of sent frames that got a reply, 0.0 when nothing was sent
    pub fn reply_rate(&self) -> f64 {
        if self.frames_sent == 0 {
            0.0
        } else {
            self.replies_received as f64 / self.frames_sent as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = TransportStatistics::new();
        stats.record_sent(12);
        stats.record_reply(0);
        stats.record_sent(12);
        stats.record_reply(18);
        assert_eq!(stats.frames_sent, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.bytes_received, 18);
        assert!((stats.reply_rate() - 0.5).abs() < f64::EPSILON);
        stats.clear();
        assert_eq!(stats, TransportStatistics::default());
    }
}
