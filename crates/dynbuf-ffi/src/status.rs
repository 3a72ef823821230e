//! C-compatible status codes.
//!
//! [`DynbufStatus`] is a `repr(i32)` enum: 0 is success, every error is
//! negative. Conversions from [`BufferError`] and [`ConfigError`] are
//! provided so entry points can map any core failure with one `from`.

use dynbuf_core::{BufferError, ConfigError};

/// Status code returned by every C ABI function.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DynbufStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// Channel or column index outside the object's range.
    InvalidChannel = -2,
    /// Element index outside the stored range.
    OutOfRange = -3,
    /// Growth failed; the object is unchanged.
    AllocationFailed = -4,
    /// Timestamped update rejected by the cache's ordering policy.
    StaleUpdate = -5,
    /// Invalid construction parameters.
    ConfigError = -6,
    /// A pointer argument is null or a scalar argument is invalid.
    InvalidArgument = -7,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -8,
    /// No record at the requested timestamp.
    NotFound = -9,
    /// Record buffer full and nothing could be evicted.
    BufferFull = -10,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the ABI boundary.
    Panicked = -128,
}

impl From<&BufferError> for DynbufStatus {
    fn from(e: &BufferError) -> Self {
        match e {
            BufferError::InvalidChannel { .. } => DynbufStatus::InvalidChannel,
            BufferError::OutOfRange { .. } => DynbufStatus::OutOfRange,
            BufferError::AllocationFailed { .. } => DynbufStatus::AllocationFailed,
            BufferError::StaleUpdate { .. } => DynbufStatus::StaleUpdate,
            BufferError::NotFound { .. } => DynbufStatus::NotFound,
            BufferError::BufferFull { .. } => DynbufStatus::BufferFull,
        }
    }
}

impl From<&ConfigError> for DynbufStatus {
    fn from(e: &ConfigError) -> Self {
        match e {
            ConfigError::Allocation(inner) => DynbufStatus::from(inner),
            _ => DynbufStatus::ConfigError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynbuf_core::ChannelId;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(DynbufStatus::Ok as i32, 0);
        assert_eq!(DynbufStatus::InvalidHandle as i32, -1);
        assert_eq!(DynbufStatus::InvalidChannel as i32, -2);
        assert_eq!(DynbufStatus::OutOfRange as i32, -3);
        assert_eq!(DynbufStatus::AllocationFailed as i32, -4);
        assert_eq!(DynbufStatus::StaleUpdate as i32, -5);
        assert_eq!(DynbufStatus::ConfigError as i32, -6);
        assert_eq!(DynbufStatus::InvalidArgument as i32, -7);
        assert_eq!(DynbufStatus::BufferTooSmall as i32, -8);
        assert_eq!(DynbufStatus::NotFound as i32, -9);
        assert_eq!(DynbufStatus::BufferFull as i32, -10);
        assert_eq!(DynbufStatus::InternalError as i32, -20);
        assert_eq!(DynbufStatus::Panicked as i32, -128);
    }

    #[test]
    fn buffer_error_to_status() {
        let cases = [
            (
                BufferError::InvalidChannel {
                    channel: ChannelId(4),
                    num_channels: 3,
                },
                DynbufStatus::InvalidChannel,
            ),
            (
                BufferError::OutOfRange { index: 9, size: 2 },
                DynbufStatus::OutOfRange,
            ),
            (
                BufferError::AllocationFailed {
                    requested: 64,
                    capacity: 32,
                },
                DynbufStatus::AllocationFailed,
            ),
            (
                BufferError::StaleUpdate {
                    channel: ChannelId(0),
                    timestamp: 1,
                    last: 2,
                },
                DynbufStatus::StaleUpdate,
            ),
            (
                BufferError::NotFound { timestamp: 5 },
                DynbufStatus::NotFound,
            ),
            (BufferError::BufferFull { rows: 30 }, DynbufStatus::BufferFull),
        ];
        for (err, status) in cases {
            assert_eq!(DynbufStatus::from(&err), status, "{err}");
        }
    }

    #[test]
    fn config_error_to_status() {
        assert_eq!(
            DynbufStatus::from(&ConfigError::NoChannels),
            DynbufStatus::ConfigError
        );
        assert_eq!(
            DynbufStatus::from(&ConfigError::Allocation(BufferError::AllocationFailed {
                requested: 1,
                capacity: 0,
            })),
            DynbufStatus::AllocationFailed
        );
    }
}
