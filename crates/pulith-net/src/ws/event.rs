/// Notification published by a [`WebSocketSession`](super::WebSocketSession).
///
/// For every connection, at most one [`SessionEvent::Disconnected`] is
/// published, and no message events follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,

    /// The connection ended. `description` carries the close reason when one
    /// is known.
    Disconnected { description: Option<String> },

    /// A complete text message, reassembled from its fragments.
    MessageReceived(String),

    MessageSent(String),

    /// A transport or protocol fault, rendered as text.
    Error(String),
}

impl SessionEvent {
    pub fn is_disconnect(&self) -> bool { matches!(self, SessionEvent::Disconnected { .. }) }
}
