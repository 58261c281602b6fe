use std::io::Read;

use crate::{
    config::MultipartConfig,
    error::{ConfigError, MultipartError},
    limits::Limits,
    multipart::Multipart,
    progress::ProgressListener,
};

/// Fluent builder for a [`Multipart`] reader.
#[derive(Default)]
pub struct MultipartBuilder {
    config: MultipartConfig,
    progress: Option<Box<dyn ProgressListener>>,
}

impl MultipartBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current configuration snapshot.
    pub fn config(&self) -> &MultipartConfig {
        &self.config
    }

    /// Replaces the full configuration.
    pub fn with_config(mut self, config: MultipartConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the window size for pulls from the byte source.
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.config.buffer_size = bytes;
        self
    }

    /// Declares the request content length reported to the progress
    /// listener. Absent means unknown.
    pub fn content_length(mut self, bytes: u64) -> Self {
        self.config.content_length = Some(bytes);
        self
    }

    /// Caps the raw byte size of one part's header block.
    pub fn max_header_block_size(mut self, bytes: usize) -> Self {
        self.config.max_header_block_size = bytes;
        self
    }

    /// Sets the size ceilings enforced mid-stream.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Attaches a progress listener, replacing the no-op default.
    pub fn progress(mut self, listener: impl ProgressListener + 'static) -> Self {
        self.progress = Some(Box::new(listener));
        self
    }

    /// Validates the boundary-independent configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// Builds the reader, validating configuration against the boundary.
    pub fn build<R: Read>(
        self,
        boundary: impl AsRef<str>,
        reader: R,
    ) -> Result<Multipart<R>, MultipartError> {
        let multipart = Multipart::with_config(boundary, reader, self.config)?;
        Ok(match self.progress {
            Some(listener) => multipart.on_progress_boxed(listener),
            None => multipart,
        })
    }
}

impl std::fmt::Debug for MultipartBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartBuilder")
            .field("config", &self.config)
            .field("progress", &self.progress.as_ref().map(|_| "listener"))
            .finish()
    }
}
