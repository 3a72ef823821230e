//! Per-timestamp reference counter.

use dynbuf_core::{BufferError, ConfigError, Timestamp};

use crate::config::RowFill;
use crate::records::RecordBuffer;

/// A single non-negative count per timestamp, ordered by timestamp.
///
/// Used to track how many consumers still need each row of a sibling
/// record buffer; rows whose count reaches zero at the front can go.
pub struct TimestampCounter {
    inner: RecordBuffer<i64>,
}

impl TimestampCounter {
    /// Create a counter with room for `3 * window_size` timestamps.
    pub fn new(window_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: RecordBuffer::new(1, window_size, RowFill::Constant(0))?,
        })
    }

    /// Add `diff` to the count at `timestamp`, creating it at zero first
    /// if needed. The result never drops below zero.
    ///
    /// Returns the new count.
    pub fn update(&mut self, timestamp: Timestamp, diff: i64) -> Result<i64, BufferError> {
        let current = self.count(timestamp).unwrap_or(0);
        let next = current.saturating_add(diff).max(0);
        self.inner.add_or_update(timestamp, 0, next)?;
        Ok(next)
    }

    /// The count at `timestamp`, if one exists.
    pub fn count(&self, timestamp: Timestamp) -> Option<i64> {
        self.inner.record(timestamp).ok().map(|row| row[0])
    }

    /// Number of leading timestamps whose count is zero.
    pub fn leading_zeros(&self) -> usize {
        self.inner.as_slice().iter().take_while(|&&c| c == 0).count()
    }

    /// Drop the `count` oldest timestamps.
    pub fn remove_front(&mut self, count: usize) {
        self.inner.remove_front(count);
    }

    /// Tracked timestamps, ascending.
    pub fn timestamps(&self) -> &[Timestamp] {
        self.inner.timestamps()
    }

    /// Number of tracked timestamps.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
