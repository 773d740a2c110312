use std::time::Duration;

/// Tuning for a [`WebSocketSession`](super::WebSocketSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Events buffered per subscriber before the slowest one starts lagging.
    ///
    /// Default: 64
    pub event_capacity: usize,

    /// How long [`close`](super::WebSocketSession::close) waits for the peer
    /// to finish the close handshake.
    ///
    /// Default: 5s
    pub close_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self { Self { event_capacity: 64, close_timeout: Duration::from_secs(5) } }
}

impl SessionConfig {
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}
