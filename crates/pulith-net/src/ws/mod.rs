//! Persistent WebSocket client session.
//!
//! A [`WebSocketSession`] owns one connection at a time: it connects, sends
//! text messages, runs a background read loop and reports everything that
//! happens through a broadcast channel of [`SessionEvent`]s.
//!
//! Sessions never reconnect on their own. After a disconnect, calling
//! [`WebSocketSession::connect`] again opens a fresh connection.

mod config;
mod event;
mod session;
mod state;

pub use config::SessionConfig;
pub use event::SessionEvent;
pub use session::WebSocketSession;
pub use state::SessionState;
