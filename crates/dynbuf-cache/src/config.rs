//! Cache configuration and the ordering policy for timestamped updates.

use dynbuf_core::{ConfigError, Sample, Timestamp};
use dynbuf_store::StoreConfig;

/// How [`update_at`](crate::LastKnownValueCache::update_at) treats a
/// timestamp that does not advance the channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderingPolicy {
    /// Every update overwrites, whatever its timestamp.
    #[default]
    AcceptAll = 0,
    /// Reject timestamps strictly older than the channel's last one.
    /// Equal timestamps overwrite.
    RejectOlder = 1,
    /// Reject timestamps older than or equal to the channel's last one.
    RejectOlderOrEqual = 2,
}

impl OrderingPolicy {
    /// Whether an update at `incoming` may replace a value written at `last`.
    pub fn admits(self, last: Option<Timestamp>, incoming: Timestamp) -> bool {
        match (self, last) {
            (Self::AcceptAll, _) | (_, None) => true,
            (Self::RejectOlder, Some(last)) => incoming >= last,
            (Self::RejectOlderOrEqual, Some(last)) => incoming > last,
        }
    }

    /// Decode the wire value used by the C ABI.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::AcceptAll),
            1 => Some(Self::RejectOlder),
            2 => Some(Self::RejectOlderOrEqual),
            _ => None,
        }
    }
}

/// Construction parameters for a
/// [`LastKnownValueCache`](crate::LastKnownValueCache).
#[derive(Clone, Debug)]
pub struct CacheConfig<T: Sample> {
    /// Number of channels. Fixed for the life of the cache; must be ≥ 1.
    pub num_channels: usize,
    /// Value every channel reports before its first update.
    pub initial_value: T,
    /// Backing store sizing. The store is grown to hold `num_channels`
    /// slots at construction, so a smaller initial capacity only costs a
    /// growth up front.
    pub store: StoreConfig,
    /// Treatment of out-of-order timestamped updates.
    pub ordering: OrderingPolicy,
}

impl<T: Sample> CacheConfig<T> {
    /// Config with `num_channels` channels and default everything else.
    pub fn new(num_channels: usize, initial_value: T) -> Self {
        Self {
            num_channels,
            initial_value,
            store: StoreConfig::new(num_channels),
            ordering: OrderingPolicy::default(),
        }
    }

    /// Set the backing store's initial capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.store.initial_capacity = initial_capacity;
        self
    }

    /// Set the ordering policy.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Check the parameters for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        self.store.validate()
    }
}
