use std::fmt;

/// Lifecycle of a [`WebSocketSession`](super::WebSocketSession).
///
/// ```text
/// None -> Connecting -> Open -> CloseSent -> Closed
///             |          |----> CloseReceived -> Closed
///             |          '----> Aborted
///             '---------------> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Never connected.
    #[default]
    None,
    Connecting,
    Open,
    /// Close frame sent locally, waiting for the peer.
    CloseSent,
    /// Close frame received from the peer, replying.
    CloseReceived,
    Closed,
    /// Connection lost without a close handshake.
    Aborted,
}

impl SessionState {
    pub fn is_open(self) -> bool { self == SessionState::Open }

    /// Whether the last connection has ended, cleanly or not.
    pub fn is_terminal(self) -> bool { matches!(self, SessionState::Closed | SessionState::Aborted) }

    /// A connection exists in some phase of its lifetime.
    pub fn is_active(self) -> bool { !self.is_terminal() && self != SessionState::None }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::None => "none",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::CloseSent => "close-sent",
            SessionState::CloseReceived => "close-received",
            SessionState::Closed => "closed",
            SessionState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}
