//! Resilient network client layer: retrying HTTP pipeline, streaming downloads
//! and persistent WebSocket sessions.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and result types
//! - [`core`] - Pure transformations (backoff schedules, status classification, body decoding)
//! - [`effects`] - I/O operations with trait abstraction
//!
//! The [`ws`] module owns the WebSocket session state machine.
//!
//! # Key Features
//!
//! - **Explicit Retry Policy**: passed by value into the pipeline, never global
//! - **Fresh Request Per Attempt**: every retry sends a clone of the built request
//! - **Result Objects**: HTTP failures are captured in the response, not raised
//! - **Structured Progress**: the download progress monitor is joined before returning
//! - **Event Channel**: WebSocket notifications are broadcast to subscribers

pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod ws;

pub use crate::core::{FromBody, Opaque, decorrelated_jitter, is_retryable_status, is_success};
pub use data::{
    Backoff, ContentType, DownloadConfig, DownloadResult, HttpRequest, HttpResponse, HttpResult,
    Payload, Progress, ProgressCallback, RequestConfig, ResponseHead, RetryPolicy,
};
pub use effects::{
    BodyStream, BoxStream, ClientResponse, DownloadManager, HttpClient, HttpPipeline, retry,
    retry_if, retry_unit,
};
pub use ws::{SessionConfig, SessionEvent, SessionState, WebSocketSession};

#[cfg(feature = "reqwest")]
pub use effects::{ClientSettings, ReqwestClient};

pub use error::{BoxError, DownloadError, HttpError, Result, WsError};

#[cfg(feature = "reqwest")]
pub use error::ClientSettingsError;
