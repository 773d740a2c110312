use std::sync::Arc;

/// Callback invoked with each progress sample of a tracked download.
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// One polling-tick sample of a download's on-disk size.
///
/// Samples are ephemeral: produced once per tick and handed to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes currently present in the destination file.
    pub current: u64,

    /// Expected total bytes from `Content-Length`; zero when unknown.
    pub total: u64,
}

impl Progress {
    pub fn new(current: u64, total: u64) -> Self { Self { current, total } }

    /// Whole-number completion percentage, `floor(current / total * 100)`.
    ///
    /// Returns `None` if `total` is unknown. Capped at 100 when more was
    /// written than the server announced.
    #[must_use]
    pub fn percentage(&self) -> Option<u64> {
        if self.total == 0 {
            return None;
        }
        let pct = u128::from(self.current) * 100 / u128::from(self.total);
        Some(pct.min(100) as u64)
    }

    /// [`percentage`](Self::percentage) rendered as text, as reported to UIs.
    #[must_use]
    pub fn percentage_label(&self) -> Option<String> { self.percentage().map(|p| p.to_string()) }

    #[must_use]
    pub fn is_complete(&self) -> bool { self.total > 0 && self.current >= self.total }
}
