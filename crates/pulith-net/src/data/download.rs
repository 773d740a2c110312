use std::fmt;
use std::path::{Path, PathBuf};

use crate::effects::BodyStream;
use crate::error::HttpError;

/// What to download and where to put it.
///
/// # Examples
///
/// ```
/// use pulith_net::DownloadConfig;
///
/// let config = DownloadConfig::new("https://example.com/tool.tar.gz")
///     .save_to("/tmp/tool.tar.gz")
///     .with_progress(true);
/// assert!(config.destination().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DownloadConfig {
    pub url: String,

    /// Persist the body to `save_path`. When false the body stream is
    /// returned to the caller untouched.
    pub save_to_disk: bool,

    pub save_path: Option<PathBuf>,

    /// Report progress while saving. Ignored when not saving.
    pub with_progress: bool,
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    /// Save the body to `path`.
    #[must_use]
    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_to_disk = true;
        self.save_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_progress(mut self, with_progress: bool) -> Self {
        self.with_progress = with_progress;
        self
    }

    /// Destination file, if the body should be persisted.
    pub fn destination(&self) -> Option<&Path> {
        if !self.save_to_disk {
            return None;
        }
        self.save_path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

/// Outcome of [`DownloadManager::download`](crate::DownloadManager::download).
#[derive(Default)]
pub struct DownloadResult {
    /// Body stream. Present when the request succeeded and the body was not
    /// consumed by saving it to disk.
    pub stream: Option<BodyStream>,

    /// Failure of the initial request.
    pub error: Option<HttpError>,

    /// File the body was written to.
    pub path: Option<PathBuf>,

    /// Bytes written to `path`.
    pub bytes_written: Option<u64>,
}

impl DownloadResult {
    pub(crate) fn failed(error: HttpError) -> Self {
        Self { error: Some(error), ..Self::default() }
    }

    pub(crate) fn streaming(stream: BodyStream) -> Self {
        Self { stream: Some(stream), ..Self::default() }
    }

    pub(crate) fn saved(path: &Path, bytes_written: u64) -> Self {
        Self { path: Some(path.to_path_buf()), bytes_written: Some(bytes_written), ..Self::default() }
    }

    pub fn is_success(&self) -> bool { self.error.is_none() }
}

impl fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadResult")
            .field("stream", &self.stream.as_ref().map(|_| "{ ... }"))
            .field("error", &self.error)
            .field("path", &self.path)
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}
