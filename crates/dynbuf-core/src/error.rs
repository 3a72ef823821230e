//! Error types for the dynbuf engine.
//!
//! [`BufferError`] covers every failure a store, cache or record buffer can
//! report to its caller. [`ConfigError`] covers construction parameters
//! rejected before any memory is allocated.

use std::error::Error;
use std::fmt;

use crate::id::{ChannelId, Timestamp};

/// Errors from store, cache and record-buffer operations.
///
/// All errors are reported synchronously; nothing is retried internally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Channel (or column) index outside `[0, num_channels)`.
    InvalidChannel {
        /// The rejected channel.
        channel: ChannelId,
        /// Number of declared channels.
        num_channels: usize,
    },
    /// Sample index outside `[0, size)`.
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// Logical size at the time of the call.
        size: usize,
    },
    /// Growth could not obtain memory. The store is unchanged.
    AllocationFailed {
        /// Capacity (in samples) the growth attempted to reach.
        requested: usize,
        /// Capacity (in samples) the store still has.
        capacity: usize,
    },
    /// An ordered update carried a timestamp the ordering policy rejects.
    StaleUpdate {
        /// The channel the update targeted.
        channel: ChannelId,
        /// Timestamp carried by the rejected update.
        timestamp: Timestamp,
        /// Timestamp of the value currently held by the channel.
        last: Timestamp,
    },
    /// No record exists for the requested timestamp.
    NotFound {
        /// The missing timestamp.
        timestamp: Timestamp,
    },
    /// A record buffer is full and no leading rows could be evicted.
    BufferFull {
        /// Row capacity of the buffer.
        rows: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel {
                channel,
                num_channels,
            } => {
                write!(
                    f,
                    "invalid channel {channel}: buffer has {num_channels} channels"
                )
            }
            Self::OutOfRange { index, size } => {
                write!(f, "index {index} out of range for size {size}")
            }
            Self::AllocationFailed {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "allocation failed: requested {requested} samples, capacity stays {capacity}"
                )
            }
            Self::StaleUpdate {
                channel,
                timestamp,
                last,
            } => {
                write!(
                    f,
                    "stale update on channel {channel}: timestamp {timestamp}, last {last}"
                )
            }
            Self::NotFound { timestamp } => write!(f, "no record at timestamp {timestamp}"),
            Self::BufferFull { rows } => {
                write!(f, "buffer full: {rows} rows and none can be evicted")
            }
        }
    }
}

impl Error for BufferError {}

/// Errors from validating construction parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A cache was declared with zero channels.
    NoChannels,
    /// A record buffer was declared with zero variables per row.
    NoVariables,
    /// A record buffer was declared with a zero-row window.
    EmptyWindow,
    /// The capacity ceiling is below the initial capacity.
    CapacityCeilingTooLow {
        /// Requested initial capacity.
        initial: usize,
        /// Configured ceiling.
        max: usize,
    },
    /// The initial allocation itself failed.
    Allocation(BufferError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChannels => write!(f, "num_channels must be at least 1"),
            Self::NoVariables => write!(f, "n_variables must be at least 1"),
            Self::EmptyWindow => write!(f, "window_size must be at least 1"),
            Self::CapacityCeilingTooLow { initial, max } => {
                write!(
                    f,
                    "max_capacity {max} is below initial_capacity {initial}"
                )
            }
            Self::Allocation(e) => write!(f, "initial allocation failed: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for ConfigError {
    fn from(e: BufferError) -> Self {
        Self::Allocation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_channel_message_names_both_sides() {
        let e = BufferError::InvalidChannel {
            channel: ChannelId(5),
            num_channels: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn allocation_error_is_config_source() {
        let inner = BufferError::AllocationFailed {
            requested: 8,
            capacity: 4,
        };
        let e = ConfigError::from(inner.clone());
        let source = e.source().expect("allocation carries a source");
        assert_eq!(source.to_string(), inner.to_string());
    }

    #[test]
    fn plain_config_errors_have_no_source() {
        assert!(ConfigError::NoChannels.source().is_none());
        assert!(ConfigError::EmptyWindow.source().is_none());
    }
}
