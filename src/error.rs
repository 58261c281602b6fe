use std::io;

use thiserror::Error;

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The read buffer is too small to hold a full boundary delimiter.
    #[error("buffer size {buffer_size} is too small; must exceed {required} for this boundary")]
    BufferTooSmall {
        /// Configured buffer size in bytes.
        buffer_size: usize,
        /// Minimum size the boundary delimiter requires.
        required: usize,
    },
    /// A configured numeric limit must be strictly greater than zero.
    #[error("limit `{limit}` must be greater than 0")]
    InvalidLimitValue {
        /// Name of the limit.
        limit: &'static str,
    },
    /// The per-part limit exceeded the configured body limit.
    #[error("`max_part_size` ({max_part_size}) cannot exceed `max_body_size` ({max_body_size})")]
    PartLimitExceedsBodyLimit {
        /// Configured `max_part_size`.
        max_part_size: u64,
        /// Configured `max_body_size`.
        max_body_size: u64,
    },
}

/// Header and Content-Type decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Generic decoding failure with message context.
    #[error("{message}")]
    Message {
        /// Decoding failure message.
        message: String,
    },
}

impl ParseError {
    /// Creates a decoding error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Runtime error type used by `partwise`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MultipartError {
    /// Input violates the multipart grammar; the parser is permanently closed.
    #[error("malformed multipart stream: {reason}")]
    MalformedStream {
        /// What the stream was missing or doing wrong.
        reason: String,
    },
    /// The boundary token supplied at construction is unusable.
    #[error("illegal multipart boundary: {reason}")]
    IllegalBoundary {
        /// Why the boundary was rejected.
        reason: &'static str,
    },
    /// The request body exceeded the configured overall size ceiling.
    #[error("multipart body of {actual} bytes exceeds the permitted {permitted} bytes")]
    BodySizeLimitExceeded {
        /// Bytes read (or declared) when the ceiling was crossed.
        actual: u64,
        /// Configured overall ceiling in bytes.
        permitted: u64,
    },
    /// A single part's body exceeded the configured per-part size ceiling.
    #[error("multipart part of {actual} bytes exceeds the permitted {permitted} bytes")]
    PartSizeLimitExceeded {
        /// Part body bytes observed when the ceiling was crossed.
        actual: u64,
        /// Configured per-part ceiling in bytes.
        permitted: u64,
    },
    /// A pull operation was issued after the parser reached its terminal state.
    #[error("multipart stream is already closed")]
    StreamClosed,
    /// The underlying byte source failed.
    #[error("I/O failure while {context}")]
    Io {
        /// Parser activity at the time of the failure.
        context: &'static str,
        /// Source failure, propagated unchanged.
        #[source]
        source: io::Error,
    },
    /// Configuration error surfaced at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Header decoding failure from the collaborator layer.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl MultipartError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedStream {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Returns `true` when the error was triggered by content a well-behaved
    /// client could avoid (an oversized upload), as opposed to a protocol or
    /// transport defect.
    pub fn is_size_limit(&self) -> bool {
        matches!(
            self,
            Self::BodySizeLimitExceeded { .. } | Self::PartSizeLimitExceeded { .. }
        )
    }
}
