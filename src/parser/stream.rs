use std::fmt;
use std::io::Read;
use std::mem;

use crate::{
    config::MultipartConfig,
    error::MultipartError,
    limits::SizeLimiter,
    parser::{
        boundary::validate_boundary,
        buffer::WindowBuffer,
        headers::RawHeaders,
        matcher::{BoundaryMatcher, MatchOutcome},
    },
    progress::{NoopProgress, ProgressListener},
};

/// Parser state. A part body must be fully consumed (or skipped) before the
/// machine advances past its closing boundary.
enum ParseState {
    /// Discarding bytes ahead of the first boundary.
    Preamble,
    /// A part's header block is parsed; its body has not been opened.
    PartReady(RawHeaders),
    /// The current part's body is being delivered.
    InBody,
    /// The closing delimiter is confirmed at the cursor but not consumed.
    BodyDone,
    /// Terminal boundary consumed; clean end of iteration.
    Closed,
    /// Unrecoverable error observed; every further pull fails.
    Failed,
}

/// Pull-based streaming multipart parser over a blocking byte source.
///
/// Drives `Preamble -> (PartReady -> InBody)* -> Closed`. One part body is
/// open at most at a time; unread body bytes are silently discarded (and
/// counted against the size ceilings) when the caller advances.
pub struct MultipartStream<R> {
    buffer: WindowBuffer<R>,
    opener: BoundaryMatcher,
    delimiter: BoundaryMatcher,
    limiter: SizeLimiter,
    progress: Box<dyn ProgressListener>,
    content_length: Option<u64>,
    max_header_block: usize,
    state: ParseState,
}

impl<R: Read> MultipartStream<R> {
    /// Creates a parser bound to one byte source and one boundary token.
    ///
    /// The boundary and configuration are validated eagerly, before any read:
    /// an unusable boundary is [`MultipartError::IllegalBoundary`], and a
    /// declared content length already over the body ceiling is rejected
    /// here rather than after the upload has been streamed.
    pub fn new(
        source: R,
        boundary: &str,
        config: MultipartConfig,
    ) -> Result<Self, MultipartError> {
        validate_boundary(boundary)?;
        config.validate()?;

        let opener = BoundaryMatcher::new(format!("--{boundary}").into_bytes());
        let delimiter = BoundaryMatcher::new(format!("\r\n--{boundary}").into_bytes());
        config.validate_buffer(delimiter.len())?;

        let limiter = SizeLimiter::new(config.limits);
        limiter.check_declared_length(config.content_length)?;

        Ok(Self {
            buffer: WindowBuffer::new(source, config.buffer_size),
            opener,
            delimiter,
            limiter,
            progress: Box::new(NoopProgress),
            content_length: config.content_length,
            max_header_block: config.max_header_block_size,
            state: ParseState::Preamble,
        })
    }

    /// Replaces the progress sink. The default sink is a no-op.
    pub fn set_progress_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.progress = listener;
    }

    /// Reports whether another part exists, advancing the machine as far as
    /// the next part's header block if needed.
    ///
    /// Any unread bytes of the current part are discarded on the way, pulled
    /// through the same size accounting as an ordinary read. `Ok(false)`
    /// means the terminal boundary was consumed and iteration is over.
    pub fn has_next(&mut self) -> Result<bool, MultipartError> {
        match self.state {
            ParseState::PartReady(_) => return Ok(true),
            ParseState::Closed => return Ok(false),
            ParseState::Failed => return Err(MultipartError::StreamClosed),
            ParseState::Preamble => {
                self.skip_preamble()?;
            }
            ParseState::InBody | ParseState::BodyDone => {
                self.skip_body()?;
                self.buffer.consume(self.delimiter.len());
                self.limiter.complete_part();
                self.after_boundary()?;
            }
        }
        Ok(matches!(self.state, ParseState::PartReady(_)))
    }

    /// Yields the pending part's raw header lines and opens its body.
    ///
    /// Fails with [`MultipartError::StreamClosed`] once the machine is
    /// closed, cleanly or not.
    pub fn next_part(&mut self) -> Result<RawHeaders, MultipartError> {
        if !self.has_next()? {
            return Err(MultipartError::StreamClosed);
        }

        match mem::replace(&mut self.state, ParseState::InBody) {
            ParseState::PartReady(headers) => {
                self.limiter.begin_part();
                Ok(headers)
            }
            other => {
                self.state = other;
                Err(MultipartError::StreamClosed)
            }
        }
    }

    /// Reads body bytes of the open part into `buf`.
    ///
    /// Only bytes confirmed not to overlap the boundary delimiter are
    /// delivered; a provisional match at the window tail forces a refill and
    /// rescan first, so a delimiter split across two refills is never leaked
    /// into the body. `Ok(0)` signals end of body, deterministically from
    /// then on, and leaves the delimiter unconsumed for the advance path.
    /// Returns `Ok(0)` as well when no part body is currently open.
    pub fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, MultipartError> {
        match self.state {
            ParseState::InBody => {}
            ParseState::Failed => return Err(MultipartError::StreamClosed),
            _ => return Ok(0),
        }
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let deliverable = match self.delimiter.find(self.buffer.available(), 0) {
                MatchOutcome::Full(0) => {
                    self.state = ParseState::BodyDone;
                    return Ok(0);
                }
                MatchOutcome::Full(at) => at,
                MatchOutcome::Partial(0) => {
                    self.refill_or_fail("stream ended inside a part body", "reading a part body")?;
                    continue;
                }
                MatchOutcome::Partial(at) => at,
                MatchOutcome::NotFound => {
                    let available = self.buffer.available().len();
                    if available == 0 {
                        self.refill_or_fail(
                            "stream ended inside a part body",
                            "reading a part body",
                        )?;
                        continue;
                    }
                    available
                }
            };

            let budget = self.limiter.part_budget();
            if budget == 0 {
                self.state = ParseState::Failed;
                return Err(self.limiter.part_overflow(deliverable));
            }

            let take = deliverable.min(budget).min(buf.len());
            buf[..take].copy_from_slice(&self.buffer.available()[..take]);
            self.buffer.consume(take);
            self.limiter.record_part_bytes(take);
            return Ok(take);
        }
    }

    /// Total bytes pulled from the byte source so far.
    pub fn bytes_read(&self) -> u64 {
        self.buffer.total_pulled()
    }

    /// Number of parts whose closing boundary has been consumed.
    pub fn parts_completed(&self) -> usize {
        self.limiter.parts_completed()
    }

    /// Discards bytes until the first boundary occurrence, leaving the
    /// cursor right after the base boundary token.
    fn skip_preamble(&mut self) -> Result<(), MultipartError> {
        loop {
            match self.opener.find(self.buffer.available(), 0) {
                MatchOutcome::Full(at) => {
                    self.buffer.consume(at + self.opener.len());
                    self.after_boundary()?;
                    return Ok(());
                }
                MatchOutcome::Partial(at) => {
                    self.buffer.consume(at);
                }
                MatchOutcome::NotFound => {
                    let skip = self.buffer.available().len();
                    self.buffer.consume(skip);
                }
            }
            self.refill_or_fail(
                "no boundary found in the request body",
                "skipping the preamble",
            )?;
        }
    }

    /// Drains the open part's remaining body bytes, counted like any read.
    fn skip_body(&mut self) -> Result<(), MultipartError> {
        let mut scratch = [0u8; 512];
        while self.read_body(&mut scratch)? > 0 {}
        Ok(())
    }

    /// Inspects the two marker bytes after a confirmed base boundary match:
    /// `--` is the terminal variant, CRLF introduces the next part's headers.
    fn after_boundary(&mut self) -> Result<(), MultipartError> {
        while self.buffer.available().len() < 2 {
            if self.refill("reading a boundary marker")? == 0 {
                self.state = ParseState::Failed;
                return Err(MultipartError::malformed("stream ended at a boundary marker"));
            }
        }

        let marker = [self.buffer.available()[0], self.buffer.available()[1]];
        match &marker {
            b"--" => {
                // Trailing bytes after the terminal boundary are never read.
                self.buffer.consume(2);
                self.state = ParseState::Closed;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    bytes_read = self.buffer.total_pulled(),
                    parts = self.limiter.parts_completed(),
                    "terminal boundary consumed"
                );
                Ok(())
            }
            b"\r\n" => {
                self.buffer.consume(2);
                let headers = self.read_header_block()?;
                #[cfg(feature = "tracing")]
                tracing::trace!(header_lines = headers.len(), "part headers parsed");
                self.state = ParseState::PartReady(headers);
                Ok(())
            }
            _ => {
                self.state = ParseState::Failed;
                Err(MultipartError::malformed("unexpected bytes follow a boundary"))
            }
        }
    }

    /// Accumulates CRLF-delimited raw header lines until the empty line.
    fn read_header_block(&mut self) -> Result<RawHeaders, MultipartError> {
        let mut lines: Vec<Vec<u8>> = Vec::new();
        let mut line: Vec<u8> = Vec::new();
        let mut block_len = 0usize;

        loop {
            while self.buffer.available().is_empty() {
                self.refill_or_fail("stream ended inside part headers", "reading part headers")?;
            }

            let byte = self.buffer.available()[0];
            self.buffer.consume(1);
            block_len += 1;
            if block_len > self.max_header_block {
                self.state = ParseState::Failed;
                return Err(MultipartError::malformed(format!(
                    "header block exceeds {} bytes",
                    self.max_header_block
                )));
            }

            line.push(byte);
            if line.ends_with(b"\r\n") {
                line.truncate(line.len() - 2);
                if line.is_empty() {
                    return Ok(RawHeaders::new(lines));
                }
                lines.push(mem::take(&mut line));
            }
        }
    }

    /// One refill through the size limiter and the progress sink.
    ///
    /// The overall ceiling is checked before the listener fires, so a
    /// listener never observes a byte count past the configured limit.
    fn refill(&mut self, context: &'static str) -> Result<usize, MultipartError> {
        let cap = self.limiter.refill_cap(self.buffer.total_pulled());
        let read = match self.buffer.refill(cap) {
            Ok(read) => read,
            Err(source) => {
                self.state = ParseState::Failed;
                return Err(MultipartError::io(context, source));
            }
        };

        if read > 0 {
            if let Err(err) = self.limiter.check_total(self.buffer.total_pulled()) {
                self.state = ParseState::Failed;
                return Err(err);
            }
            self.progress.update(
                self.buffer.total_pulled(),
                self.content_length,
                self.limiter.parts_completed(),
            );
        }
        Ok(read)
    }

    /// Refill that treats upstream end of stream as a malformed multipart
    /// body, with the parser activity as I/O context.
    fn refill_or_fail(
        &mut self,
        eof_reason: &'static str,
        context: &'static str,
    ) -> Result<(), MultipartError> {
        if self.refill(context)? == 0 {
            self.state = ParseState::Failed;
            return Err(MultipartError::malformed(eof_reason));
        }
        Ok(())
    }
}

impl<R> fmt::Debug for MultipartStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            ParseState::Preamble => "Preamble",
            ParseState::PartReady(_) => "PartReady",
            ParseState::InBody => "InBody",
            ParseState::BodyDone => "BodyDone",
            ParseState::Closed => "Closed",
            ParseState::Failed => "Failed",
        };
        f.debug_struct("MultipartStream")
            .field("state", &state)
            .field("delimiter", &self.delimiter)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
