use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::{
    error::{MultipartError, ParseError},
    parser::{
        headers::{ParsedPartHeaders, RawHeaders},
        stream::MultipartStream,
    },
};

/// One part of a multipart body: its raw header lines plus a bounded view
/// over the body bytes.
///
/// A part mutably borrows the parser, so at most one part is open at a time;
/// dropping it without draining the body is fine — the remaining bytes are
/// discarded (and counted against the size ceilings) when the parser
/// advances to the next part.
#[derive(Debug)]
pub struct Part<'a, R> {
    stream: &'a mut MultipartStream<R>,
    headers: RawHeaders,
}

impl<'a, R: Read> Part<'a, R> {
    pub(crate) fn new(stream: &'a mut MultipartStream<R>, headers: RawHeaders) -> Self {
        Self { stream, headers }
    }

    /// The part's raw header lines, in wire order, undecoded.
    pub fn raw_headers(&self) -> &RawHeaders {
        &self.headers
    }

    /// Decodes the headers a form-data part is expected to carry.
    pub fn headers(&self) -> Result<ParsedPartHeaders, ParseError> {
        self.headers.parse()
    }

    /// Reads the remaining body into memory.
    pub fn bytes(&mut self) -> Result<Bytes, MultipartError> {
        let mut out = BytesMut::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = self.stream.read_body(&mut chunk)?;
            if read == 0 {
                return Ok(out.freeze());
            }
            out.extend_from_slice(&chunk[..read]);
        }
    }

    /// Reads the remaining body and decodes it as UTF-8 text.
    pub fn text(&mut self) -> Result<String, MultipartError> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ParseError::new("part body is not valid UTF-8").into())
    }

    /// Discards the remaining body bytes, returning how many were dropped.
    ///
    /// The discard pulls through the same size accounting as a read.
    pub fn discard(mut self) -> Result<u64, MultipartError> {
        let mut dropped = 0u64;
        let mut chunk = [0u8; 4096];
        loop {
            let read = self.stream.read_body(&mut chunk)?;
            if read == 0 {
                return Ok(dropped);
            }
            dropped += read as u64;
        }
    }
}

/// Sequential body reads; `Ok(0)` is end of body, deterministically.
///
/// Parser failures (size limits, malformed stream, source errors) surface as
/// `io::Error` values wrapping the typed [`MultipartError`].
impl<R: Read> Read for Part<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read_body(buf).map_err(io::Error::other)
    }
}
