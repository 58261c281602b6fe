use crate::error::MultipartError;

/// Size ceilings enforced during multipart parsing.
///
/// Both ceilings are optional; an absent ceiling means unbounded.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Maximum number of bytes pulled from the source for the whole request,
    /// boundaries and headers included.
    pub max_body_size: Option<u64>,
    /// Maximum number of body bytes for a single part.
    pub max_part_size: Option<u64>,
}

impl Limits {
    /// Creates a permissive limits configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall request-body ceiling.
    pub fn max_body_size(mut self, bytes: u64) -> Self {
        self.max_body_size = Some(bytes);
        self
    }

    /// Sets the per-part body ceiling.
    pub fn max_part_size(mut self, bytes: u64) -> Self {
        self.max_part_size = Some(bytes);
        self
    }
}

/// Runtime counters behind [`Limits`].
///
/// The overall ceiling is checked against the buffer's pulled-byte counter
/// after every refill; the per-part ceiling caps how many body bytes each
/// part may deliver. Errors are raised at the read that crosses a ceiling,
/// never retroactively, so bytes already handed to the caller never exceed
/// the configured value.
#[derive(Debug)]
pub(crate) struct SizeLimiter {
    limits: Limits,
    part_read: u64,
    parts_completed: usize,
}

impl SizeLimiter {
    pub(crate) fn new(limits: Limits) -> Self {
        Self {
            limits,
            part_read: 0,
            parts_completed: 0,
        }
    }

    /// Caps a refill request so the read that crosses the overall ceiling
    /// pulls at most one byte past it.
    pub(crate) fn refill_cap(&self, total_pulled: u64) -> usize {
        match self.limits.max_body_size {
            Some(max) => {
                let remaining = max.saturating_sub(total_pulled).saturating_add(1);
                usize::try_from(remaining).unwrap_or(usize::MAX)
            }
            None => usize::MAX,
        }
    }

    /// Checks the overall ceiling against the buffer counter after a refill.
    pub(crate) fn check_total(&self, total_pulled: u64) -> Result<(), MultipartError> {
        match self.limits.max_body_size {
            Some(max) if total_pulled > max => {
                #[cfg(feature = "tracing")]
                tracing::debug!(actual = total_pulled, permitted = max, "body size limit crossed");
                Err(MultipartError::BodySizeLimitExceeded {
                    actual: total_pulled,
                    permitted: max,
                })
            }
            _ => Ok(()),
        }
    }

    /// Rejects a declared content length that already exceeds the overall
    /// ceiling, before any byte is read.
    pub(crate) fn check_declared_length(&self, declared: Option<u64>) -> Result<(), MultipartError> {
        match (declared, self.limits.max_body_size) {
            (Some(declared), Some(max)) if declared > max => {
                Err(MultipartError::BodySizeLimitExceeded {
                    actual: declared,
                    permitted: max,
                })
            }
            _ => Ok(()),
        }
    }

    /// Resets the per-part counter at the start of a part body.
    pub(crate) fn begin_part(&mut self) {
        self.part_read = 0;
    }

    /// Remaining per-part budget in bytes for the current part.
    pub(crate) fn part_budget(&self) -> usize {
        match self.limits.max_part_size {
            Some(max) => {
                let remaining = max.saturating_sub(self.part_read);
                usize::try_from(remaining).unwrap_or(usize::MAX)
            }
            None => usize::MAX,
        }
    }

    /// Records body bytes delivered (or skipped) for the current part.
    pub(crate) fn record_part_bytes(&mut self, count: usize) {
        self.part_read += count as u64;
    }

    /// Builds the per-part error for a read that would deliver `pending`
    /// confirmed body bytes past an exhausted budget.
    pub(crate) fn part_overflow(&self, pending: usize) -> MultipartError {
        let permitted = self.limits.max_part_size.unwrap_or(0);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            actual = self.part_read + pending as u64,
            permitted,
            "part size limit crossed"
        );
        MultipartError::PartSizeLimitExceeded {
            actual: self.part_read + pending as u64,
            permitted,
        }
    }

    /// Marks the current part's closing boundary as consumed.
    pub(crate) fn complete_part(&mut self) {
        self.parts_completed += 1;
    }

    pub(crate) fn parts_completed(&self) -> usize {
        self.parts_completed
    }
}
