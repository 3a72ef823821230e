//! Record buffer configuration.

use dynbuf_core::{ConfigError, Sample};

/// How a freshly inserted row is initialised before its one written
/// column is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowFill<T> {
    /// Every column starts at the given value (e.g. NaN).
    Constant(T),
    /// Columns start as a copy of the preceding row in timestamp order.
    /// A row with no predecessor (the first row, or one inserted ahead of
    /// every existing row) starts at the given value.
    Forward(T),
}

impl<T: Sample> RowFill<T> {
    /// The value used when no preceding row exists.
    pub fn seed(&self) -> T {
        match *self {
            Self::Constant(v) | Self::Forward(v) => v,
        }
    }
}

/// Construction parameters for a [`RecordBuffer`](crate::RecordBuffer).
#[derive(Clone, Debug)]
pub struct RecordConfig<T: Sample> {
    /// Samples per row. Must be ≥ 1.
    pub n_variables: usize,
    /// Nominal number of rows a consumer works with. The buffer holds
    /// [`WINDOW_FACTOR`](Self::WINDOW_FACTOR) times as many.
    pub window_size: usize,
    /// Initialisation of new rows.
    pub fill: RowFill<T>,
}

impl<T: Sample> RecordConfig<T> {
    /// Row capacity as a multiple of the window size.
    pub const WINDOW_FACTOR: usize = 3;

    /// Config with the given row initialisation.
    pub fn new(n_variables: usize, window_size: usize, fill: RowFill<T>) -> Self {
        Self {
            n_variables,
            window_size,
            fill,
        }
    }

    /// Maximum number of rows held at once.
    pub fn row_capacity(&self) -> usize {
        Self::WINDOW_FACTOR.saturating_mul(self.window_size)
    }

    /// Check the parameters for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_variables == 0 {
            return Err(ConfigError::NoVariables);
        }
        if self.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }
}
