//! Allocation statistics for a growable store.

/// Counters describing how a store's allocation has evolved.
///
/// Updated on every growth attempt; read with
/// [`GrowableStore::stats`](crate::GrowableStore::stats).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Successful moves to a larger allocation.
    pub growths: u64,
    /// Growth attempts that failed and left the store unchanged.
    pub failed_growths: u64,
    /// Total samples copied across all growths.
    pub samples_copied: u64,
    /// Capacity reached by the most recent growth, in samples.
    pub peak_capacity: usize,
}
