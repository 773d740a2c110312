//! Error types for pulith-net.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::core::is_retryable_status;

/// Type-erased transport error carried by [`HttpError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = HttpError> = std::result::Result<T, E>;

/// Failure captured by the HTTP pipeline.
///
/// These never escape [`HttpPipeline`](crate::HttpPipeline) as a raised fault;
/// they are stored in the returned [`HttpResponse`](crate::HttpResponse).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid value for header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("{reason} (HTTP {status})")]
    Status { status: u16, reason: String },

    #[error("failed to read response body: {0}")]
    Body(#[source] BoxError),
}

impl HttpError {
    pub fn transport(err: impl Into<BoxError>) -> Self { HttpError::Transport(err.into()) }

    /// Transport faults, including a body cut off mid-transfer, and server
    /// faults (5xx, 408) are retryable; everything else is surfaced on the
    /// first attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Transport(_) | HttpError::Body(_) => true,
            HttpError::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Status code for server-reported failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Faults raised by [`DownloadManager::download`](crate::DownloadManager::download)
/// once the initial request succeeded.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to write {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("response body failed mid-transfer: {0}")]
    Body(#[source] HttpError),

    #[error("progress monitor panicked: {0}")]
    Monitor(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum WsError {
    #[error("invalid websocket URL: {0}")]
    InvalidUrl(String),

    #[error("websocket connect failed: {0}")]
    Connect(#[source] Box<tungstenite::Error>),

    #[error("websocket send failed: {0}")]
    Send(#[source] Box<tungstenite::Error>),

    #[error("websocket close failed: {0}")]
    Close(#[source] Box<tungstenite::Error>),
}

#[cfg(feature = "reqwest")]
#[derive(Debug, Error)]
pub enum ClientSettingsError {
    #[error("invalid proxy URL {url}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build client: {0}")]
    Build(#[source] reqwest::Error),
}
