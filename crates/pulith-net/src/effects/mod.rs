//! I/O operations: transport access, retry execution, the HTTP pipeline and
//! the download manager.
//!
//! Everything that touches the network, the filesystem or the clock lives
//! here. The transport itself sits behind [`HttpClient`] so the pipeline can
//! be driven by any implementation, including test doubles.

mod download;
mod http;
mod pipeline;
mod retry;

pub use download::{DEFAULT_POLL_INTERVAL, DownloadManager};
pub use self::http::{BodyStream, BoxStream, ClientResponse, HttpClient};
pub use pipeline::HttpPipeline;
pub use retry::{retry, retry_if, retry_unit};

#[cfg(feature = "reqwest")]
pub use self::http::{ClientSettings, ReqwestClient};
