//! The generic timestamp-keyed record buffer.

use std::ops::Range;

use dynbuf_core::{BufferError, ChannelId, ConfigError, Sample, Timestamp};
use dynbuf_store::{BufferView, GrowableStore, StoreConfig};
use tracing::debug;

use crate::config::{RecordConfig, RowFill};

/// Rows of `n_variables` samples, keyed and ordered by timestamp.
///
/// Storage is sized once for the full row capacity and capped there, so
/// the buffer never reallocates after construction: views and slices
/// only shift content, never addresses.
pub struct RecordBuffer<T: Sample> {
    rows: GrowableStore<T>,
    /// Row timestamps, ascending. `timestamps[i]` keys row `i`.
    timestamps: Vec<Timestamp>,
    /// Outstanding reference count per row.
    counters: Vec<u32>,
    n_variables: usize,
    window_size: usize,
    row_capacity: usize,
    fill: RowFill<T>,
}

impl<T: Sample> RecordBuffer<T> {
    /// Create a buffer with `n_variables` columns per row and room for
    /// `3 * window_size` rows.
    pub fn new(n_variables: usize, window_size: usize, fill: RowFill<T>) -> Result<Self, ConfigError> {
        Self::with_config(&RecordConfig::new(n_variables, window_size, fill))
    }

    /// Create a buffer from a config.
    pub fn with_config(config: &RecordConfig<T>) -> Result<Self, ConfigError> {
        config.validate()?;
        let row_capacity = config.row_capacity();
        let samples = row_capacity.checked_mul(config.n_variables).ok_or(
            BufferError::AllocationFailed {
                requested: usize::MAX,
                capacity: 0,
            },
        )?;
        let rows =
            GrowableStore::with_config(&StoreConfig::new(samples).with_max_capacity(samples))?;
        Ok(Self {
            rows,
            timestamps: Vec::with_capacity(row_capacity),
            counters: Vec::with_capacity(row_capacity),
            n_variables: config.n_variables,
            window_size: config.window_size,
            row_capacity,
            fill: config.fill,
        })
    }

    /// Write `value` into `column` of the row at `timestamp`.
    ///
    /// Returns `true` when a new row was created. An existing row is
    /// overwritten in place and its counter incremented. A new row is
    /// inserted at its sorted position, initialised per the buffer's
    /// [`RowFill`], and starts with counter 1. When the buffer is full,
    /// leading released rows are evicted first; if none are,
    /// `BufferFull` is returned.
    pub fn add_or_update(
        &mut self,
        timestamp: Timestamp,
        column: usize,
        value: T,
    ) -> Result<bool, BufferError> {
        if column >= self.n_variables {
            return Err(BufferError::InvalidChannel {
                channel: ChannelId(u32::try_from(column).unwrap_or(u32::MAX)),
                num_channels: self.n_variables,
            });
        }

        if let Ok(row) = self.timestamps.binary_search(&timestamp) {
            self.rows.set(row * self.n_variables + column, value)?;
            self.counters[row] = self.counters[row].saturating_add(1);
            return Ok(false);
        }

        if self.timestamps.len() >= self.row_capacity {
            self.evict_released();
            if self.timestamps.len() >= self.row_capacity {
                return Err(BufferError::BufferFull {
                    rows: self.row_capacity,
                });
            }
        }

        let row = match self.timestamps.binary_search(&timestamp) {
            Ok(row) | Err(row) => row,
        };
        let start = row * self.n_variables;
        self.rows
            .insert_fill_at(start, self.n_variables, self.fill.seed())?;
        if matches!(self.fill, RowFill::Forward(_)) && row > 0 {
            let prev = start - self.n_variables;
            self.rows.as_mut_slice().copy_within(prev..start, start);
        }
        self.rows.set(start + column, value)?;
        self.timestamps.insert(row, timestamp);
        self.counters.insert(row, 1);
        Ok(true)
    }

    /// The row at `timestamp`.
    pub fn record(&self, timestamp: Timestamp) -> Result<&[T], BufferError> {
        let row = self.row_of(timestamp)?;
        Ok(&self.rows.as_slice()[self.row_span(row..row + 1)])
    }

    /// The row at position `index` in timestamp order.
    pub fn record_at(&self, index: usize) -> Result<&[T], BufferError> {
        if index >= self.timestamps.len() {
            return Err(BufferError::OutOfRange {
                index,
                size: self.timestamps.len(),
            });
        }
        Ok(&self.rows.as_slice()[self.row_span(index..index + 1)])
    }

    /// Zero-copy view of the row at `timestamp`.
    pub fn record_view(&self, timestamp: Timestamp) -> Result<BufferView<T>, BufferError> {
        let row = self.row_of(timestamp)?;
        self.rows.view_range(self.row_span(row..row + 1))
    }

    /// Up to `n` consecutive rows ending at `timestamp` (inclusive), as one
    /// flat row-major slice.
    pub fn slice(&self, timestamp: Timestamp, n: usize) -> Result<&[T], BufferError> {
        let rows = self.rows_ending_at(timestamp, n)?;
        Ok(&self.rows.as_slice()[self.row_span(rows)])
    }

    /// Timestamps of the rows [`slice`](Self::slice) would return.
    pub fn slice_timestamps(&self, timestamp: Timestamp, n: usize) -> Result<&[Timestamp], BufferError> {
        let rows = self.rows_ending_at(timestamp, n)?;
        Ok(&self.timestamps[rows])
    }

    /// Zero-copy view of the rows [`slice`](Self::slice) would return.
    pub fn slice_view(&self, timestamp: Timestamp, n: usize) -> Result<BufferView<T>, BufferError> {
        let rows = self.rows_ending_at(timestamp, n)?;
        self.rows.view_range(self.row_span(rows))
    }

    /// Remove the row at `timestamp`. Returns whether it existed.
    pub fn delete(&mut self, timestamp: Timestamp) -> bool {
        let Ok(row) = self.timestamps.binary_search(&timestamp) else {
            return false;
        };
        let span = self.row_span(row..row + 1);
        if self.rows.remove_range(span).is_err() {
            return false;
        }
        self.timestamps.remove(row);
        self.counters.remove(row);
        true
    }

    /// Drop the `count` oldest rows (all rows if `count` exceeds the length).
    pub fn remove_front(&mut self, count: usize) {
        let count = count.min(self.timestamps.len());
        if count == 0 {
            return;
        }
        let removed = self.rows.remove_range(self.row_span(0..count));
        debug_assert!(removed.is_ok(), "front span exceeds stored rows: {removed:?}");
        self.timestamps.drain(..count);
        self.counters.drain(..count);
    }

    /// Decrement the counter of each listed row, stopping at zero.
    ///
    /// Timestamps without a row are ignored.
    pub fn release(&mut self, timestamps: &[Timestamp]) {
        for ts in timestamps {
            if let Ok(row) = self.timestamps.binary_search(ts) {
                self.counters[row] = self.counters[row].saturating_sub(1);
            }
        }
    }

    /// Evict the leading run of rows whose counter is zero.
    ///
    /// Returns the number of rows evicted.
    pub fn evict_released(&mut self) -> usize {
        let released = self.counters.iter().take_while(|&&c| c == 0).count();
        if released > 0 {
            debug!(
                rows = released,
                remaining = self.timestamps.len() - released,
                "evicting released rows"
            );
            self.remove_front(released);
        }
        released
    }

    /// Per-row reference counters, in timestamp order.
    pub fn counters(&self) -> &[u32] {
        &self.counters
    }

    /// Row timestamps, ascending.
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Whether a row exists at `timestamp`.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.timestamps.binary_search(&timestamp).is_ok()
    }

    /// Oldest timestamp held.
    pub fn min_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    /// Newest timestamp held.
    pub fn max_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the buffer holds no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Samples per row.
    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    /// Nominal window size given at construction.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Maximum number of rows.
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    /// All rows, flat and row-major.
    pub fn as_slice(&self) -> &[T] {
        self.rows.as_slice()
    }

    /// The backing store, for inspection.
    pub fn store(&self) -> &GrowableStore<T> {
        &self.rows
    }

    fn row_of(&self, timestamp: Timestamp) -> Result<usize, BufferError> {
        self.timestamps
            .binary_search(&timestamp)
            .map_err(|_| BufferError::NotFound { timestamp })
    }

    fn rows_ending_at(&self, timestamp: Timestamp, n: usize) -> Result<Range<usize>, BufferError> {
        let end = self.row_of(timestamp)? + 1;
        Ok(end.saturating_sub(n)..end)
    }

    fn row_span(&self, rows: Range<usize>) -> Range<usize> {
        rows.start * self.n_variables..rows.end * self.n_variables
    }
}
