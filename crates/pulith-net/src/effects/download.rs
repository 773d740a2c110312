use std::path::Path;
use std::time::Duration;

use futures_util::TryStreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, trace, warn};

use crate::data::{DownloadConfig, DownloadResult, HttpRequest, Progress, ProgressCallback};
use crate::effects::http::{BodyStream, HttpClient};
use crate::effects::pipeline::{content_length, parse_url};
use crate::error::{DownloadError, HttpError};

/// How often the progress monitor samples the destination file.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Downloads a resource either as a stream or into a file on disk.
///
/// While a file is being written, progress is reported by sampling the
/// file's size on disk rather than counting transferred bytes.
pub struct DownloadManager<C: HttpClient> {
    client: C,
    poll_interval: Duration,
}

impl<C: HttpClient> DownloadManager<C> {
    pub fn new(client: C) -> Self { Self { client, poll_interval: DEFAULT_POLL_INTERVAL } }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Fetch `config.url`.
    ///
    /// A failure of the initial request (invalid URL, transport fault,
    /// non-2xx status) is captured in [`DownloadResult::error`] and no file
    /// is created. Once the body is flowing, faults while copying it to disk
    /// are returned as [`DownloadError`].
    ///
    /// When saving with progress enabled and `on_progress` set, the total
    /// size is taken from a separate HEAD request and samples are delivered
    /// on a background task, which has stopped by the time this returns.
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn download(
        &self,
        config: &DownloadConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<DownloadResult, DownloadError> {
        let url = match parse_url(&config.url) {
            Ok(url) => url,
            Err(e) => return Ok(DownloadResult::failed(e)),
        };

        let response = match self.client.execute(HttpRequest::get(url)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "download request failed");
                return Ok(DownloadResult::failed(HttpError::transport(e)));
            }
        };

        if !response.head.is_success() {
            warn!(status = response.head.status, "download answered with failure status");
            return Ok(DownloadResult::failed(response.head.status_error()));
        }

        let stream = response.into_body_stream();

        let Some(path) = config.destination() else {
            return Ok(DownloadResult::streaming(stream));
        };

        let monitor = match on_progress {
            Some(callback) if config.with_progress => {
                let total = self.total_size(&config.url).await;
                Some(Monitor::spawn(path, total, self.poll_interval, callback))
            }
            _ => None,
        };

        let copied = copy_to_file(stream, path).await;
        let stopped = match monitor {
            Some(monitor) => monitor.stop().await,
            None => Ok(()),
        };

        // A transfer fault outranks a failed progress callback.
        let written = copied?;
        stopped?;
        info!(path = %path.display(), bytes = written, "download saved");
        Ok(DownloadResult::saved(path, written))
    }

    /// Total size for progress reporting; 0 when unknown.
    async fn total_size(&self, url: &str) -> u64 {
        match content_length(&self.client, url).await {
            Ok(Some(len)) => len,
            Ok(None) => {
                debug!("server did not report a content length");
                0
            }
            Err(e) => {
                warn!(error = %e, "size query failed; progress total unknown");
                0
            }
        }
    }
}

async fn copy_to_file(mut stream: BodyStream, path: &Path) -> Result<u64, DownloadError> {
    let io_err = |source| DownloadError::Copy { path: path.to_path_buf(), source };

    let mut file = File::create(path).await.map_err(io_err)?;
    let mut written = 0u64;

    while let Some(chunk) = stream.try_next().await.map_err(DownloadError::Body)? {
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(io_err)?;
    Ok(written)
}

/// Background task sampling the size of a file being written.
struct Monitor {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Monitor {
    fn spawn(path: &Path, total: u64, period: Duration, callback: ProgressCallback) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let path = path.to_path_buf();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {}
                }

                match tokio::fs::metadata(&path).await {
                    Ok(meta) => callback(&Progress::new(meta.len(), total)),
                    Err(e) => trace!(path = %path.display(), error = %e, "file not ready"),
                }
            }
        });

        Self { stop, handle }
    }

    /// Signal the task and wait for it to finish.
    async fn stop(self) -> Result<(), DownloadError> {
        // The task may already be gone; the join below reports why.
        let _ = self.stop.send(());
        self.handle.await?;
        Ok(())
    }
}
