/// Boundary extraction and validation.
pub mod boundary;
/// Sliding byte window over the blocking source.
pub mod buffer;
/// Raw part headers and their semantic decoding.
pub mod headers;
/// Boundary delimiter matching inside a window.
pub mod matcher;
/// Streaming multipart state machine.
pub mod stream;

pub use boundary::{boundary_from_content_type, validate_boundary};
pub use buffer::WindowBuffer;
pub use headers::{
    ContentDisposition, ParsedPartHeaders, RawHeaders, parse_content_disposition,
    parse_part_content_type,
};
pub use matcher::{BoundaryMatcher, MatchOutcome};
pub use stream::MultipartStream;
