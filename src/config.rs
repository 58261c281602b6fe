use crate::{error::ConfigError, limits::Limits};

/// Default window size for pulls from the byte source.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default cap on a single part's header block.
pub const DEFAULT_MAX_HEADER_BLOCK_SIZE: usize = 10 * 1024;

/// Parser configuration supplied at construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Window size in bytes for pulls from the byte source. Must be strictly
    /// greater than the boundary delimiter length plus one; validated when
    /// the parser is built, once the boundary is known.
    pub buffer_size: usize,
    /// Declared request content length in bytes; `None` when the source does
    /// not declare a length up front. Reported verbatim to the progress
    /// listener, never derived from parsing.
    pub content_length: Option<u64>,
    /// Cap on the raw byte size of one part's header block.
    pub max_header_block_size: usize,
    /// Size ceilings enforced mid-stream.
    pub limits: Limits,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            content_length: None,
            max_header_block_size: DEFAULT_MAX_HEADER_BLOCK_SIZE,
            limits: Limits::default(),
        }
    }
}

impl MultipartConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the boundary-independent parts of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_header_block_size == 0 {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_header_block_size",
            });
        }

        if self.limits.max_body_size == Some(0) {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_body_size",
            });
        }

        if self.limits.max_part_size == Some(0) {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_part_size",
            });
        }

        if let (Some(part), Some(body)) = (self.limits.max_part_size, self.limits.max_body_size) {
            if part > body {
                return Err(ConfigError::PartLimitExceedsBodyLimit {
                    max_part_size: part,
                    max_body_size: body,
                });
            }
        }

        Ok(())
    }

    /// Validates the buffer size against the boundary delimiter length.
    pub(crate) fn validate_buffer(&self, delimiter_len: usize) -> Result<(), ConfigError> {
        if self.buffer_size <= delimiter_len + 1 {
            return Err(ConfigError::BufferTooSmall {
                buffer_size: self.buffer_size,
                required: delimiter_len + 1,
            });
        }
        Ok(())
    }
}
