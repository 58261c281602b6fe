//! Sliding byte window over a blocking reader.

use std::io::{self, ErrorKind, Read};

/// Fixed-capacity window of source bytes with a consume cursor.
///
/// `refill` compacts whatever the consumer left unconsumed to the front of
/// the window before reading, so a boundary delimiter whose prefix sits at
/// the window tail is still intact after the next read. The consumer holds
/// back unresolved partial matches (at most `delimiter length - 1` bytes)
/// instead of consuming them, which is what makes a split across two refills
/// detectable.
#[derive(Debug)]
pub struct WindowBuffer<R> {
    source: R,
    window: Vec<u8>,
    cursor: usize,
    filled: usize,
    total_pulled: u64,
    eof: bool,
}

impl<R: Read> WindowBuffer<R> {
    /// Creates a window of `capacity` bytes over `source`.
    pub fn new(source: R, capacity: usize) -> Self {
        Self {
            source,
            window: vec![0; capacity],
            cursor: 0,
            filled: 0,
            total_pulled: 0,
            eof: false,
        }
    }

    /// Bytes available to the consumer: the window from the cursor to the
    /// end of valid data.
    pub fn available(&self) -> &[u8] {
        &self.window[self.cursor..self.filled]
    }

    /// Advances the cursor by `n` bytes.
    ///
    /// `n` must not exceed the available byte count; violating this is a
    /// programming-contract error, not a stream error.
    pub fn consume(&mut self, n: usize) {
        assert!(
            n <= self.filled - self.cursor,
            "consume({n}) exceeds the {} available bytes",
            self.filled - self.cursor
        );
        self.cursor += n;
    }

    /// Pulls up to `max_new` fresh bytes from the source into the window,
    /// preserving everything unconsumed.
    ///
    /// Returns the count of newly available bytes; 0 signals upstream end of
    /// stream (once end of stream is seen, all further refills return 0).
    pub fn refill(&mut self, max_new: usize) -> io::Result<usize> {
        if self.eof || max_new == 0 {
            return Ok(0);
        }

        if self.cursor > 0 {
            self.window.copy_within(self.cursor..self.filled, 0);
            self.filled -= self.cursor;
            self.cursor = 0;
        }

        let free = self.window.len() - self.filled;
        assert!(free > 0, "refill on a full window");
        let want = free.min(max_new);

        let read = loop {
            match self.source.read(&mut self.window[self.filled..self.filled + want]) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };

        if read == 0 {
            self.eof = true;
        } else {
            self.filled += read;
            self.total_pulled += read as u64;
        }

        Ok(read)
    }

    /// Total bytes pulled from the source over the buffer's lifetime.
    /// Monotonically non-decreasing.
    pub fn total_pulled(&self) -> u64 {
        self.total_pulled
    }

    /// Returns `true` once the source has reported end of stream.
    pub fn source_exhausted(&self) -> bool {
        self.eof
    }
}
