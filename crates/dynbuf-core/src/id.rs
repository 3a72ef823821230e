//! Strongly-typed identifiers and the [`Timestamp`] alias.

use std::fmt;

/// Identifies a channel within a last-known-value cache.
///
/// Channels are declared at construction and numbered densely:
/// `ChannelId(n)` is the n-th slot, valid while `n < num_channels`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

impl ChannelId {
    /// The channel as a slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChannelId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Per-channel update sequence.
///
/// Starts at 0 for a channel that was never written and advances by one
/// on each accepted update. Saturates at `u64::MAX` instead of wrapping,
/// so ordering comparisons stay valid for the life of a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(pub u64);

impl Sequence {
    /// Sequence of a channel that has never been updated.
    pub const ZERO: Sequence = Sequence(0);

    /// The following sequence, saturating at `u64::MAX`.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Whether the counter has reached its ceiling.
    pub fn is_saturated(self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sequence {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Allocation generation of a growable store.
///
/// Incremented each time the store moves to a new allocation. A view
/// taken at generation `g` is only valid while the store is still at `g`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The following generation.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Caller-supplied timestamp keying records and ordered updates.
pub type Timestamp = i64;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sequence_next_advances() {
        assert_eq!(Sequence::ZERO.next(), Sequence(1));
        assert_eq!(Sequence(41).next(), Sequence(42));
    }

    #[test]
    fn sequence_saturates_at_max() {
        let top = Sequence(u64::MAX);
        assert!(top.is_saturated());
        assert_eq!(top.next(), top);
    }

    #[test]
    fn channel_index_matches_inner() {
        assert_eq!(ChannelId(7).index(), 7);
        assert_eq!(ChannelId::from(3u32), ChannelId(3));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(ChannelId(5).to_string(), "5");
        assert_eq!(Sequence(9).to_string(), "9");
        assert_eq!(Generation(2).to_string(), "2");
    }

    proptest! {
        #[test]
        fn sequence_next_is_strictly_increasing(v in 0u64..u64::MAX) {
            let s = Sequence(v);
            prop_assert!(s.next() > s);
            prop_assert_eq!(s.next().0, v + 1);
            prop_assert!(!s.is_saturated());
        }

        #[test]
        fn sequence_next_fixed_at_ceiling(steps in 1usize..16) {
            let mut s = Sequence(u64::MAX);
            for _ in 0..steps {
                s = s.next();
            }
            prop_assert_eq!(s, Sequence(u64::MAX));
        }

        #[test]
        fn display_parses_back(ch in any::<u32>(), seq in any::<u64>(), generation in any::<u64>()) {
            prop_assert_eq!(ChannelId(ch).to_string().parse::<u32>().unwrap(), ch);
            prop_assert_eq!(Sequence(seq).to_string().parse::<u64>().unwrap(), seq);
            prop_assert_eq!(Generation(generation).to_string().parse::<u64>().unwrap(), generation);
        }
    }
}
