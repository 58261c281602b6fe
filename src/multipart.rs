use std::io::Read;

use crate::{
    config::MultipartConfig,
    error::MultipartError,
    parser::{boundary::boundary_from_content_type, stream::MultipartStream},
    part::Part,
    progress::ProgressListener,
};

/// Pull-based multipart reader bound to one byte source and one boundary.
///
/// ```no_run
/// use partwise::Multipart;
///
/// fn handle(body: impl std::io::Read, boundary: &str) -> Result<(), partwise::MultipartError> {
///     let mut multipart = Multipart::new(boundary, body)?;
///     while multipart.has_next()? {
///         let mut part = multipart.next_part()?;
///         let headers = part.headers()?;
///         let body = part.bytes()?;
///         println!("{}: {} bytes", headers.field_name, body.len());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Multipart<R> {
    inner: MultipartStream<R>,
}

impl<R: Read> Multipart<R> {
    /// Creates a multipart reader with default configuration.
    pub fn new(boundary: impl AsRef<str>, reader: R) -> Result<Self, MultipartError> {
        Self::with_config(boundary, reader, MultipartConfig::default())
    }

    /// Creates a multipart reader with explicit, eagerly validated
    /// configuration.
    pub fn with_config(
        boundary: impl AsRef<str>,
        reader: R,
        config: MultipartConfig,
    ) -> Result<Self, MultipartError> {
        Ok(Self {
            inner: MultipartStream::new(reader, boundary.as_ref(), config)?,
        })
    }

    /// Creates a multipart reader straight from a request `Content-Type`
    /// header value carrying the boundary parameter.
    pub fn from_content_type(content_type: &str, reader: R) -> Result<Self, MultipartError> {
        let boundary = boundary_from_content_type(content_type)?;
        Self::new(boundary, reader)
    }

    /// Attaches a progress listener, replacing the no-op default.
    pub fn on_progress(self, listener: impl ProgressListener + 'static) -> Self {
        self.on_progress_boxed(Box::new(listener))
    }

    pub(crate) fn on_progress_boxed(mut self, listener: Box<dyn ProgressListener>) -> Self {
        self.inner.set_progress_listener(listener);
        self
    }

    /// Reports whether another part exists.
    ///
    /// Advancing past an unread part body silently discards its remaining
    /// bytes, counted against the size ceilings like any other read. Returns
    /// `Ok(false)` exactly when the terminal boundary has been consumed;
    /// after a failure every call reports [`MultipartError::StreamClosed`].
    pub fn has_next(&mut self) -> Result<bool, MultipartError> {
        self.inner.has_next()
    }

    /// Opens the next part.
    ///
    /// Fails with [`MultipartError::StreamClosed`] once iteration is over,
    /// cleanly or not; use [`Multipart::has_next`] to detect the clean end.
    pub fn next_part(&mut self) -> Result<Part<'_, R>, MultipartError> {
        let headers = self.inner.next_part()?;
        Ok(Part::new(&mut self.inner, headers))
    }

    /// Total bytes pulled from the byte source so far.
    pub fn bytes_read(&self) -> u64 {
        self.inner.bytes_read()
    }

    /// Number of parts whose closing boundary has been consumed.
    pub fn parts_completed(&self) -> usize {
        self.inner.parts_completed()
    }
}
