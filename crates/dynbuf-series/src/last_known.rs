//! Forward-filling record buffer.

use std::ops::Deref;

use dynbuf_core::{BufferError, ConfigError, Timestamp};

use crate::config::RowFill;
use crate::records::RecordBuffer;

/// A [`RecordBuffer`] of `f64` whose new rows start as a copy of the
/// preceding row, so every row carries the last known value of each
/// variable as of its timestamp. The first row starts at NaN.
///
/// Reads go through `Deref` to the underlying [`RecordBuffer`].
pub struct LastKnownValuesBuffer {
    inner: RecordBuffer<f64>,
}

impl LastKnownValuesBuffer {
    /// Create a buffer with `n_variables` columns and room for
    /// `3 * window_size` rows.
    pub fn new(n_variables: usize, window_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: RecordBuffer::new(n_variables, window_size, RowFill::Forward(f64::NAN))?,
        })
    }

    /// Record `value` for `column` at `timestamp`. Returns `true` when the
    /// timestamp opened a new row.
    pub fn update(&mut self, timestamp: Timestamp, column: usize, value: f64) -> Result<bool, BufferError> {
        self.inner.add_or_update(timestamp, column, value)
    }

    /// Decrement the reference counters of the listed rows.
    pub fn release(&mut self, timestamps: &[Timestamp]) {
        self.inner.release(timestamps);
    }

    /// Remove the row at `timestamp`.
    pub fn delete(&mut self, timestamp: Timestamp) -> bool {
        self.inner.delete(timestamp)
    }

    /// Drop the `count` oldest rows.
    pub fn remove_front(&mut self, count: usize) {
        self.inner.remove_front(count);
    }
}

impl Deref for LastKnownValuesBuffer {
    type Target = RecordBuffer<f64>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_is_nan_except_written_column() {
        let mut buf = LastKnownValuesBuffer::new(3, 4).unwrap();
        assert!(buf.update(10, 1, 5.0).unwrap());
        let row = buf.record(10).unwrap();
        assert!(row[0].is_nan());
        assert_eq!(row[1], 5.0);
        assert!(row[2].is_nan());
    }

    #[test]
    fn new_row_carries_previous_values() {
        let mut buf = LastKnownValuesBuffer::new(2, 4).unwrap();
        assert!(buf.update(100, 0, 1.0).unwrap());
        assert!(!buf.update(100, 1, 2.0).unwrap());
        assert!(buf.update(101, 0, 1.5).unwrap());
        assert_eq!(buf.record(101).unwrap(), &[1.5, 2.0]);
        assert_eq!(buf.record(100).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn late_row_copies_its_predecessor_not_the_newest() {
        let mut buf = LastKnownValuesBuffer::new(2, 4).unwrap();
        buf.update(100, 0, 1.0).unwrap();
        buf.update(100, 1, 2.0).unwrap();
        buf.update(110, 1, 9.0).unwrap();
        assert!(buf.update(105, 0, 3.0).unwrap());
        assert_eq!(buf.record(105).unwrap(), &[3.0, 2.0]);
        assert_eq!(buf.timestamps(), &[100, 105, 110]);
    }

    #[test]
    fn row_before_every_other_starts_at_nan() {
        let mut buf = LastKnownValuesBuffer::new(2, 4).unwrap();
        buf.update(100, 0, 1.0).unwrap();
        buf.update(100, 1, 2.0).unwrap();
        assert!(buf.update(50, 0, 9.0).unwrap());
        let row = buf.record(50).unwrap();
        assert_eq!(row[0], 9.0);
        assert!(row[1].is_nan());
        assert_eq!(buf.record(100).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn release_and_delete_delegate() {
        let mut buf = LastKnownValuesBuffer::new(1, 1).unwrap();
        buf.update(1, 0, 1.0).unwrap();
        buf.update(2, 0, 2.0).unwrap();
        buf.release(&[1]);
        assert_eq!(buf.counters(), &[0, 1]);
        assert!(buf.delete(2));
        buf.remove_front(1);
        assert!(buf.is_empty());
    }
}
