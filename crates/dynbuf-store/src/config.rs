//! Store configuration parameters.

use dynbuf_core::ConfigError;

/// Configuration for a [`GrowableStore`](crate::GrowableStore).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of samples allocated up front. Zero is allowed; the first
    /// append then grows the store to one sample.
    pub initial_capacity: usize,

    /// Upper bound on capacity, in samples.
    ///
    /// Growth that would need more than this fails with
    /// `AllocationFailed` exactly as an allocator refusal would, which is
    /// how memory-constrained hosts (and tests) bound a store. Doubling is
    /// clamped to the ceiling while the requested size still fits.
    pub max_capacity: Option<usize>,
}

impl StoreConfig {
    /// Default initial capacity in samples.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

    /// Create a config with the given initial capacity and no ceiling.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            max_capacity: None,
        }
    }

    /// Set a capacity ceiling.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Check the parameters for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_capacity {
            if max < self.initial_capacity {
                return Err(ConfigError::CapacityCeilingTooLow {
                    initial: self.initial_capacity,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_ceiling() {
        let config = StoreConfig::default();
        assert_eq!(config.initial_capacity, StoreConfig::DEFAULT_INITIAL_CAPACITY);
        assert!(config.max_capacity.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ceiling_below_initial_is_rejected() {
        let config = StoreConfig::new(8).with_max_capacity(4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityCeilingTooLow { initial: 8, max: 4 })
        );
    }

    #[test]
    fn ceiling_equal_to_initial_is_fine() {
        assert!(StoreConfig::new(4).with_max_capacity(4).validate().is_ok());
    }
}
