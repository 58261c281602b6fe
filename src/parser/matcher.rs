//! Exact byte-sequence boundary matching over a buffer window.

/// Result of scanning a window for the boundary delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The full delimiter occurs at this window offset.
    Full(usize),
    /// A proper prefix of the delimiter runs from this offset to the end of
    /// the window. The delimiter may continue in bytes not yet read, so the
    /// caller must refill and rescan before concluding absence.
    Partial(usize),
    /// No occurrence and no tail prefix; every scanned byte is plain content.
    NotFound,
}

/// Finds occurrences of one boundary delimiter inside a byte window,
/// including matches that straddle a window refill.
#[derive(Debug, Clone)]
pub struct BoundaryMatcher {
    needle: Vec<u8>,
}

impl BoundaryMatcher {
    /// Creates a matcher for an exact delimiter byte sequence.
    pub fn new(needle: impl Into<Vec<u8>>) -> Self {
        let needle = needle.into();
        debug_assert!(!needle.is_empty());
        Self { needle }
    }

    /// Length of the delimiter in bytes.
    pub fn len(&self) -> usize {
        self.needle.len()
    }

    /// Returns `true` for an empty delimiter. Never the case for matchers
    /// built by this crate.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// The delimiter bytes this matcher scans for.
    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    /// Scans `window` left to right for the delimiter, starting at `from`.
    ///
    /// The first candidate position wins: a full match is reported even when
    /// a later offset would also match, and a tail prefix is only reported
    /// when no full match exists at or before it. Plain linear scan; the
    /// delimiter is tens of bytes, so nothing smarter is needed.
    pub fn find(&self, window: &[u8], from: usize) -> MatchOutcome {
        let needle = self.needle.as_slice();
        let first = needle[0];

        let mut at = from;
        while at < window.len() {
            // Skip ahead to the next possible start byte.
            match window[at..].iter().position(|&b| b == first) {
                Some(skip) => at += skip,
                None => return MatchOutcome::NotFound,
            }

            let rest = window.len() - at;
            if rest >= needle.len() {
                if window[at..at + needle.len()] == *needle {
                    return MatchOutcome::Full(at);
                }
            } else if window[at..] == needle[..rest] {
                return MatchOutcome::Partial(at);
            }

            at += 1;
        }

        MatchOutcome::NotFound
    }
}
