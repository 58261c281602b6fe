//! Progress reporting for long-running uploads.
//!
//! A listener is attached at construction (see
//! [`Multipart::on_progress`](crate::Multipart::on_progress)) and invoked
//! once after every buffer refill that pulled new bytes. All three reported
//! fields are non-decreasing for the lifetime of one parser instance.

/// Notification sink for parse progress.
pub trait ProgressListener {
    /// Called after a refill with the total bytes pulled from the source so
    /// far, the declared content length (`None` when the source did not
    /// declare one), and the number of fully consumed parts.
    fn update(&mut self, bytes_read: u64, content_length: Option<u64>, parts_completed: usize);
}

/// Listener used when no progress sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressListener for NoopProgress {
    fn update(&mut self, _bytes_read: u64, _content_length: Option<u64>, _parts_completed: usize) {}
}

impl<F> ProgressListener for F
where
    F: FnMut(u64, Option<u64>, usize),
{
    fn update(&mut self, bytes_read: u64, content_length: Option<u64>, parts_completed: usize) {
        self(bytes_read, content_length, parts_completed)
    }
}
