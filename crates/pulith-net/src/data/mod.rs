//! Immutable data types for the network layer.
//!
//! This module contains the configuration types, request descriptions,
//! result objects and progress samples used throughout the crate. Configs
//! are built by the caller and only read by the pipeline; result objects are
//! filled by the pipeline and handed over to the caller on return.

pub mod download;
pub mod progress;
pub mod request;
pub mod response;
pub mod retry;

pub use download::{DownloadConfig, DownloadResult};
pub use progress::{Progress, ProgressCallback};
pub use request::{ContentType, HttpRequest, RequestConfig};
pub use response::{HttpResponse, HttpResult, Payload, ResponseHead};
pub use retry::{Backoff, RetryPolicy};
