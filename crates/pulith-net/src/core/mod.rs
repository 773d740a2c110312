//! Pure transformations for the HTTP pipeline.
//!
//! Nothing here performs I/O: backoff schedules, status classification,
//! request assembly and body decoding are all plain functions over data.

mod backoff;
mod body;
mod headers;
mod validation;

pub use backoff::{decorrelated_jitter, fixed_delays, jitter_ceiling};
pub use body::{FromBody, Opaque, decode_text};
pub use headers::build_request;
pub use validation::{is_retryable_status, is_success};
