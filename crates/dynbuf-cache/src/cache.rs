//! The last-known-value cache.

use dynbuf_core::{BufferError, ChannelId, ConfigError, Generation, Sample, Sequence, Timestamp};
use dynbuf_store::{BufferView, GrowableStore};
use tracing::debug;

use crate::config::{CacheConfig, OrderingPolicy};
use crate::counter::ChannelCounter;

/// Most recent value and update sequence for each of a fixed set of
/// channels.
///
/// Slots live contiguously in channel order inside a [`GrowableStore`],
/// so [`snapshot_slice`](Self::snapshot_slice) and
/// [`snapshot_view`](Self::snapshot_view) expose the dense state without
/// copying. The slot count is fixed at construction and updates never
/// allocate, so a snapshot view stays valid for the life of the cache.
pub struct LastKnownValueCache<T: Sample = f64> {
    slots: GrowableStore<T>,
    counter: ChannelCounter,
    last_timestamps: Vec<Option<Timestamp>>,
    initial_value: T,
    ordering: OrderingPolicy,
}

impl<T: Sample> LastKnownValueCache<T> {
    /// Create a cache of `num_channels` channels, all reporting
    /// `initial_value` at sequence 0.
    pub fn new(num_channels: usize, initial_value: T) -> Result<Self, ConfigError> {
        Self::with_config(&CacheConfig::new(num_channels, initial_value))
    }

    /// Create a cache from a full config.
    pub fn with_config(config: &CacheConfig<T>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut slots = GrowableStore::with_config(&config.store)?;
        slots.reserve(config.num_channels)?;
        for _ in 0..config.num_channels {
            slots.append(config.initial_value)?;
        }
        debug!(
            num_channels = config.num_channels,
            capacity = slots.capacity(),
            ordering = ?config.ordering,
            sample = T::TYPE_NAME,
            "last-known-value cache created"
        );
        Ok(Self {
            slots,
            counter: ChannelCounter::new(config.num_channels),
            last_timestamps: vec![None; config.num_channels],
            initial_value: config.initial_value,
            ordering: config.ordering,
        })
    }

    /// Overwrite `channel` with `value` and return its new sequence.
    ///
    /// O(1), never allocates. Out-of-range channels are rejected, never
    /// clamped.
    pub fn update(&mut self, channel: ChannelId, value: T) -> Result<Sequence, BufferError> {
        self.check_channel(channel)?;
        self.slots.set(channel.index(), value)?;
        self.counter.bump(channel)
    }

    /// Overwrite `channel` with a value observed at `timestamp`.
    ///
    /// The configured [`OrderingPolicy`] decides whether a timestamp that
    /// does not advance the channel is accepted. A rejected update returns
    /// `StaleUpdate` and leaves the channel untouched.
    pub fn update_at(
        &mut self,
        channel: ChannelId,
        value: T,
        timestamp: Timestamp,
    ) -> Result<Sequence, BufferError> {
        self.check_channel(channel)?;
        let last = self.last_timestamps[channel.index()];
        if !self.ordering.admits(last, timestamp) {
            return Err(BufferError::StaleUpdate {
                channel,
                timestamp,
                last: last.unwrap_or(timestamp),
            });
        }
        let seq = self.update(channel, value)?;
        self.last_timestamps[channel.index()] = Some(timestamp);
        Ok(seq)
    }

    /// Current value and sequence of `channel`.
    pub fn value_of(&self, channel: ChannelId) -> Result<(T, Sequence), BufferError> {
        self.check_channel(channel)?;
        let value = self.slots.get(channel.index())?;
        let seq = self.counter.current(channel)?;
        Ok((value, seq))
    }

    /// Timestamp of the last accepted [`update_at`](Self::update_at), if any.
    pub fn last_timestamp(&self, channel: ChannelId) -> Result<Option<Timestamp>, BufferError> {
        self.check_channel(channel)?;
        Ok(self.last_timestamps[channel.index()])
    }

    /// Copy every channel's current value, in channel order.
    pub fn snapshot(&self) -> Vec<T> {
        self.slots.as_slice().to_vec()
    }

    /// Copy the snapshot into `out`, which must hold `num_channels` samples.
    ///
    /// Returns the number of samples written.
    pub fn snapshot_into(&self, out: &mut [T]) -> Result<usize, BufferError> {
        let src = self.slots.as_slice();
        let out_len = out.len();
        let dst = out.get_mut(..src.len()).ok_or(BufferError::OutOfRange {
            index: src.len(),
            size: out_len,
        })?;
        dst.copy_from_slice(src);
        Ok(src.len())
    }

    /// Borrow the dense snapshot without copying.
    pub fn snapshot_slice(&self) -> &[T] {
        self.slots.as_slice()
    }

    /// Zero-copy view of the dense snapshot for a foreign consumer.
    pub fn snapshot_view(&self) -> BufferView<T> {
        self.slots.view()
    }

    /// Reset every channel to the initial value and sequence 0.
    ///
    /// Reuses the existing slots; outstanding views stay valid.
    pub fn reset(&mut self) {
        self.slots.as_mut_slice().fill(self.initial_value);
        self.counter = ChannelCounter::new(self.num_channels());
        self.last_timestamps.fill(None);
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.counter.num_channels()
    }

    /// Value reported by channels that were never updated.
    pub fn initial_value(&self) -> T {
        self.initial_value
    }

    /// Ordering policy for timestamped updates.
    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    /// Every channel's sequence in channel order.
    pub fn sequences(&self) -> &[Sequence] {
        self.counter.sequences()
    }

    /// Capacity of the backing store, in samples.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Samples held by the backing store (always `num_channels`).
    pub fn size(&self) -> usize {
        self.slots.size()
    }

    /// Allocation generation of the backing store.
    pub fn generation(&self) -> Generation {
        self.slots.generation()
    }

    /// The backing store, for inspection.
    pub fn store(&self) -> &GrowableStore<T> {
        &self.slots
    }

    fn check_channel(&self, channel: ChannelId) -> Result<(), BufferError> {
        let num_channels = self.num_channels();
        if channel.index() < num_channels {
            Ok(())
        } else {
            Err(BufferError::InvalidChannel {
                channel,
                num_channels,
            })
        }
    }
}
