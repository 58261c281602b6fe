#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Synchronous, pull-based streaming multipart/form-data parser.
//!
//! The parser reads a boundary-delimited request body from any blocking
//! [`std::io::Read`] source and exposes it as a sequence of parts — raw
//! header lines plus a bounded body stream — without ever buffering the
//! whole request. Boundary matches that straddle buffer refills are handled,
//! size ceilings are enforced at the read that crosses them, and a progress
//! listener can observe the parse as it happens.

/// Fluent builder API.
pub mod builder;
/// Parser configuration.
pub mod config;
/// Error types exposed by this crate.
pub mod error;
/// Size ceilings enforced during parsing.
pub mod limits;
/// High-level pull-based multipart reader.
pub mod multipart;
/// Low-level parser components.
pub mod parser;
/// One parsed part: raw headers plus a bounded body stream.
pub mod part;
/// Progress reporting hooks.
pub mod progress;

pub use builder::MultipartBuilder;
pub use config::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_HEADER_BLOCK_SIZE, MultipartConfig};
pub use error::{ConfigError, MultipartError, ParseError};
pub use limits::Limits;
pub use multipart::Multipart;
pub use parser::{
    ContentDisposition, ParsedPartHeaders, RawHeaders, boundary_from_content_type,
    validate_boundary,
};
pub use part::Part;
pub use progress::{NoopProgress, ProgressListener};
