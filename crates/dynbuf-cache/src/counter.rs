//! Per-channel monotonic sequence counters.

use dynbuf_core::{BufferError, ChannelId, Sequence};

/// One saturating sequence counter per channel.
///
/// Overflow policy: counters saturate at `u64::MAX`. A saturated channel
/// keeps accepting updates but its sequence stops advancing.
#[derive(Clone, Debug)]
pub struct ChannelCounter {
    sequences: Vec<Sequence>,
}

impl ChannelCounter {
    /// Create counters for `num_channels` channels, all at sequence 0.
    pub fn new(num_channels: usize) -> Self {
        Self {
            sequences: vec![Sequence::ZERO; num_channels],
        }
    }

    /// Advance `channel` and return its new sequence.
    pub fn bump(&mut self, channel: ChannelId) -> Result<Sequence, BufferError> {
        let num_channels = self.sequences.len();
        let slot = self
            .sequences
            .get_mut(channel.index())
            .ok_or(BufferError::InvalidChannel {
                channel,
                num_channels,
            })?;
        *slot = slot.next();
        Ok(*slot)
    }

    /// Current sequence of `channel`.
    pub fn current(&self, channel: ChannelId) -> Result<Sequence, BufferError> {
        self.sequences
            .get(channel.index())
            .copied()
            .ok_or(BufferError::InvalidChannel {
                channel,
                num_channels: self.sequences.len(),
            })
    }

    /// Number of channels tracked.
    pub fn num_channels(&self) -> usize {
        self.sequences.len()
    }

    /// Every channel's sequence in channel order.
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    #[cfg(test)]
    pub(crate) fn force(&mut self, channel: ChannelId, seq: Sequence) {
        self.sequences[channel.index()] = seq;
    }
}
