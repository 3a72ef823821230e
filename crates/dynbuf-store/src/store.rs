//! Contiguous growable sample storage.
//!
//! A [`GrowableStore`] is a `Vec<T>` whose allocation is managed by hand:
//! the vector is never allowed to reallocate on its own. When the logical
//! capacity is exhausted the store obtains a fresh allocation, copies every
//! sample across, and only then releases the old one. Either the whole
//! move succeeds and the generation advances, or nothing changes.

use std::ops::Range;

use dynbuf_core::{BufferError, ConfigError, Generation, Sample};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::stats::StoreStats;
use crate::view::BufferView;

/// Contiguous, resizable storage for fixed-width samples.
///
/// Logical indices are stable across growth: sample `i` stays sample `i`,
/// only its physical address changes. Every address change increments
/// [`generation`](Self::generation), which invalidates outstanding
/// [`BufferView`]s.
pub struct GrowableStore<T: Sample> {
    /// Backing storage. `data.len()` is the logical size and
    /// `data.capacity() >= capacity` always holds.
    data: Vec<T>,
    /// Logical capacity reported to callers.
    capacity: usize,
    max_capacity: Option<usize>,
    generation: Generation,
    stats: StoreStats,
}

impl<T: Sample> GrowableStore<T> {
    /// Create a store with room for `initial_capacity` samples.
    ///
    /// Like `Vec::with_capacity`, aborts if the initial allocation cannot
    /// be made. Use [`with_config`](Self::with_config) for a fallible
    /// constructor.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(initial_capacity),
            capacity: initial_capacity,
            max_capacity: None,
            generation: Generation::default(),
            stats: StoreStats {
                peak_capacity: initial_capacity,
                ..StoreStats::default()
            },
        }
    }

    /// Create a store from a validated config.
    ///
    /// Returns `ConfigError::Allocation` if the initial allocation fails.
    pub fn with_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut data = Vec::new();
        data.try_reserve_exact(config.initial_capacity)
            .map_err(|_| BufferError::AllocationFailed {
                requested: config.initial_capacity,
                capacity: 0,
            })?;
        Ok(Self {
            data,
            capacity: config.initial_capacity,
            max_capacity: config.max_capacity,
            generation: Generation::default(),
            stats: StoreStats {
                peak_capacity: config.initial_capacity,
                ..StoreStats::default()
            },
        })
    }

    /// Append a sample, growing first if the store is full.
    ///
    /// Returns the index assigned to the sample. Amortized O(1).
    pub fn append(&mut self, sample: T) -> Result<usize, BufferError> {
        let index = self.data.len();
        self.ensure_capacity(index + 1)?;
        self.data.push(sample);
        Ok(index)
    }

    /// Append every sample of `samples`, growing at most once.
    ///
    /// Returns the index of the first appended sample.
    pub fn extend_from_slice(&mut self, samples: &[T]) -> Result<usize, BufferError> {
        let start = self.data.len();
        let needed = start
            .checked_add(samples.len())
            .ok_or(BufferError::AllocationFailed {
                requested: usize::MAX,
                capacity: self.capacity,
            })?;
        self.ensure_capacity(needed)?;
        self.data.extend_from_slice(samples);
        Ok(start)
    }

    /// Read the sample at `index`.
    pub fn get(&self, index: usize) -> Result<T, BufferError> {
        self.data
            .get(index)
            .copied()
            .ok_or(BufferError::OutOfRange {
                index,
                size: self.data.len(),
            })
    }

    /// Overwrite the sample at `index` in place.
    pub fn set(&mut self, index: usize, sample: T) -> Result<(), BufferError> {
        let size = self.data.len();
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = sample;
                Ok(())
            }
            None => Err(BufferError::OutOfRange { index, size }),
        }
    }

    /// Make room for at least `additional` more samples.
    ///
    /// Grows by the usual doubling rule if needed. This is the explicit
    /// resize: it invalidates views only when it actually reallocates.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let needed =
            self.data
                .len()
                .checked_add(additional)
                .ok_or(BufferError::AllocationFailed {
                    requested: usize::MAX,
                    capacity: self.capacity,
                })?;
        self.ensure_capacity(needed)
    }

    /// Insert `samples` before position `index`, shifting the tail right.
    ///
    /// `index == size()` appends.
    pub fn insert_slice_at(&mut self, index: usize, samples: &[T]) -> Result<(), BufferError> {
        let size = self.data.len();
        if index > size {
            return Err(BufferError::OutOfRange { index, size });
        }
        self.extend_from_slice(samples)?;
        self.data[index..].rotate_right(samples.len());
        Ok(())
    }

    /// Insert `count` copies of `sample` before position `index`.
    pub fn insert_fill_at(
        &mut self,
        index: usize,
        count: usize,
        sample: T,
    ) -> Result<(), BufferError> {
        let size = self.data.len();
        if index > size {
            return Err(BufferError::OutOfRange { index, size });
        }
        self.reserve(count)?;
        self.data.resize(size + count, sample);
        self.data[index..].rotate_right(count);
        Ok(())
    }

    /// Remove the samples in `range`, shifting the tail left.
    ///
    /// Never reallocates; capacity and generation are unchanged.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<(), BufferError> {
        let size = self.data.len();
        if range.start > range.end {
            return Err(BufferError::OutOfRange {
                index: range.start,
                size,
            });
        }
        if range.end > size {
            return Err(BufferError::OutOfRange {
                index: range.end,
                size,
            });
        }
        self.data.drain(range);
        Ok(())
    }

    /// Shorten the store to `len` samples. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Drop every sample, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Logical capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples stored.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Alias of [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current allocation generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Configured capacity ceiling, if any.
    pub fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Growth statistics.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Bytes reserved by the current allocation.
    pub fn memory_bytes(&self) -> usize {
        self.capacity * T::WIDTH
    }

    /// All stored samples in index order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the stored samples. Cannot change the size.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Acquire a view of every stored sample.
    pub fn view(&self) -> BufferView<T> {
        BufferView::new(self.data.as_ptr(), self.data.len(), self.generation)
    }

    /// Acquire a view of the samples in `range`.
    pub fn view_range(&self, range: Range<usize>) -> Result<BufferView<T>, BufferError> {
        let part = self
            .data
            .get(range.clone())
            .ok_or(BufferError::OutOfRange {
                index: range.end,
                size: self.data.len(),
            })?;
        Ok(BufferView::new(part.as_ptr(), part.len(), self.generation))
    }

    /// Grow until at least `needed` samples fit.
    fn ensure_capacity(&mut self, needed: usize) -> Result<(), BufferError> {
        if needed <= self.capacity {
            return Ok(());
        }
        let target = self.next_capacity(needed);
        self.reallocate(target)
    }

    /// Doubling growth (minimum increment 1), clamped to the ceiling when
    /// `needed` itself still fits under it.
    fn next_capacity(&self, needed: usize) -> usize {
        let mut cap = self.capacity;
        while cap < needed {
            cap = cap.saturating_mul(2).max(cap.saturating_add(1));
        }
        match self.max_capacity {
            Some(max) if needed <= max => cap.min(max),
            _ => cap,
        }
    }

    /// Move to a fresh allocation of `new_capacity` samples.
    ///
    /// The old allocation is only released after every sample has been
    /// copied. On failure nothing observable changes.
    fn reallocate(&mut self, new_capacity: usize) -> Result<(), BufferError> {
        let refused = BufferError::AllocationFailed {
            requested: new_capacity,
            capacity: self.capacity,
        };
        if self.max_capacity.is_some_and(|max| new_capacity > max) {
            self.stats.failed_growths += 1;
            warn!(
                requested = new_capacity,
                capacity = self.capacity,
                max_capacity = ?self.max_capacity,
                "store growth refused by capacity ceiling"
            );
            return Err(refused);
        }

        let mut fresh: Vec<T> = Vec::new();
        if fresh.try_reserve_exact(new_capacity).is_err() {
            self.stats.failed_growths += 1;
            warn!(
                requested = new_capacity,
                capacity = self.capacity,
                sample = T::TYPE_NAME,
                "store growth failed: allocator refused"
            );
            return Err(refused);
        }
        fresh.extend_from_slice(&self.data);

        let old_capacity = self.capacity;
        let copied = fresh.len();
        drop(std::mem::replace(&mut self.data, fresh));
        self.capacity = new_capacity;
        self.generation = self.generation.next();
        self.stats.growths += 1;
        self.stats.samples_copied += copied as u64;
        self.stats.peak_capacity = self.stats.peak_capacity.max(new_capacity);

        debug!(
            from = old_capacity,
            to = new_capacity,
            copied,
            generation = self.generation.0,
            "store grew"
        );
        Ok(())
    }
}

impl<T: Sample> Default for GrowableStore<T> {
    fn default() -> Self {
        Self::new(StoreConfig::DEFAULT_INITIAL_CAPACITY)
    }
}

impl<T: Sample + std::fmt::Debug> std::fmt::Debug for GrowableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableStore")
            .field("size", &self.data.len())
            .field("capacity", &self.capacity)
            .field("generation", &self.generation)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store: GrowableStore<f64> = GrowableStore::new(4);
        assert_eq!(store.size(), 0);
        assert_eq!(store.capacity(), 4);
        assert!(store.is_empty());
        assert_eq!(store.generation(), Generation(0));
    }

    #[test]
    fn append_returns_sequential_indices() {
        let mut store = GrowableStore::new(4);
        assert_eq!(store.append(1.0f64).unwrap(), 0);
        assert_eq!(store.append(2.0).unwrap(), 1);
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn append_past_capacity_doubles_and_keeps_order() {
        let mut store = GrowableStore::new(2);
        store.append(10i64).unwrap();
        store.append(20).unwrap();
        store.append(30).unwrap();
        assert_eq!(store.size(), 3);
        assert!(store.capacity() >= 3);
        assert_eq!(store.capacity(), 4);
        assert_eq!(store.get(2).unwrap(), 30);
        assert_eq!(store.as_slice(), &[10, 20, 30]);
        assert_eq!(store.generation(), Generation(1));
    }

    #[test]
    fn zero_capacity_grows_by_one() {
        let mut store = GrowableStore::new(0);
        store.append(7u32).unwrap();
        assert_eq!(store.capacity(), 1);
        store.append(8).unwrap();
        assert_eq!(store.capacity(), 2);
        store.append(9).unwrap();
        assert_eq!(store.capacity(), 4);
    }

    #[test]
    fn get_out_of_range() {
        let mut store = GrowableStore::new(2);
        store.append(1.0f32).unwrap();
        assert_eq!(
            store.get(1),
            Err(BufferError::OutOfRange { index: 1, size: 1 })
        );
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut store = GrowableStore::new(2);
        store.append(1.0f64).unwrap();
        store.set(0, 5.0).unwrap();
        assert_eq!(store.get(0).unwrap(), 5.0);
        assert_eq!(store.generation(), Generation(0));
    }

    #[test]
    fn set_out_of_range() {
        let mut store: GrowableStore<f64> = GrowableStore::new(2);
        assert!(matches!(
            store.set(0, 1.0),
            Err(BufferError::OutOfRange { index: 0, size: 0 })
        ));
    }

    #[test]
    fn ceiling_refusal_leaves_store_untouched() {
        let config = StoreConfig::new(2).with_max_capacity(2);
        let mut store = GrowableStore::with_config(&config).unwrap();
        store.append(1i32).unwrap();
        store.append(2).unwrap();
        let before = store.generation();

        let err = store.append(3).unwrap_err();
        assert_eq!(
            err,
            BufferError::AllocationFailed {
                requested: 4,
                capacity: 2
            }
        );
        assert_eq!(store.size(), 2);
        assert_eq!(store.capacity(), 2);
        assert_eq!(store.as_slice(), &[1, 2]);
        assert_eq!(store.generation(), before);
        assert_eq!(store.stats().failed_growths, 1);
    }

    #[test]
    fn doubling_clamps_to_ceiling() {
        let config = StoreConfig::new(4).with_max_capacity(6);
        let mut store = GrowableStore::with_config(&config).unwrap();
        store.extend_from_slice(&[0u64; 4]).unwrap();
        store.append(4).unwrap();
        assert_eq!(store.capacity(), 6);
        store.append(5).unwrap();
        assert!(store.append(6).is_err());
        assert_eq!(store.size(), 6);
    }

    #[test]
    fn with_config_rejects_bad_ceiling() {
        let config = StoreConfig::new(8).with_max_capacity(2);
        assert!(GrowableStore::<f64>::with_config(&config).is_err());
    }

    #[test]
    fn reserve_grows_once() {
        let mut store: GrowableStore<f64> = GrowableStore::new(1);
        store.reserve(10).unwrap();
        assert!(store.capacity() >= 10);
        assert_eq!(store.generation(), Generation(1));
        store.reserve(5).unwrap();
        assert_eq!(store.generation(), Generation(1));
    }

    #[test]
    fn insert_slice_shifts_tail() {
        let mut store = GrowableStore::new(8);
        store.extend_from_slice(&[1i64, 2, 5, 6]).unwrap();
        store.insert_slice_at(2, &[3, 4]).unwrap();
        assert_eq!(store.as_slice(), &[1, 2, 3, 4, 5, 6]);
        store.insert_slice_at(6, &[7]).unwrap();
        assert_eq!(store.get(6).unwrap(), 7);
        assert!(store.insert_slice_at(99, &[0]).is_err());
    }

    #[test]
    fn insert_fill_opens_a_gap() {
        let mut store = GrowableStore::new(2);
        store.extend_from_slice(&[1u32, 4]).unwrap();
        store.insert_fill_at(1, 2, 0).unwrap();
        assert_eq!(store.as_slice(), &[1, 0, 0, 4]);
        assert!(store.insert_fill_at(5, 1, 0).is_err());
    }

    #[test]
    fn remove_range_shifts_left_without_realloc() {
        let mut store = GrowableStore::new(8);
        store.extend_from_slice(&[1i64, 2, 3, 4, 5]).unwrap();
        let gen = store.generation();
        store.remove_range(1..3).unwrap();
        assert_eq!(store.as_slice(), &[1, 4, 5]);
        assert_eq!(store.generation(), gen);
        assert_eq!(store.capacity(), 8);
        assert!(store.remove_range(2..9).is_err());
    }

    #[test]
    fn clear_keeps_capacity_and_generation() {
        let mut store = GrowableStore::new(1);
        store.append(1u32).unwrap();
        store.append(2).unwrap();
        let gen = store.generation();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
        assert_eq!(store.generation(), gen);
    }

    #[test]
    fn stats_track_growth() {
        let mut store = GrowableStore::new(1);
        for i in 0..5u32 {
            store.append(i).unwrap();
        }
        // 1 -> 2 -> 4 -> 8
        assert_eq!(store.stats().growths, 3);
        assert_eq!(store.stats().samples_copied, 1 + 2 + 4);
        assert_eq!(store.stats().peak_capacity, 8);
        assert_eq!(store.memory_bytes(), 8 * 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn appends_preserve_order(
                initial in 0usize..8,
                values in proptest::collection::vec(any::<i64>(), 0..200),
            ) {
                let mut store = GrowableStore::new(initial);
                for (i, &v) in values.iter().enumerate() {
                    prop_assert_eq!(store.append(v).unwrap(), i);
                }
                prop_assert_eq!(store.size(), values.len());
                prop_assert!(store.capacity() >= values.len());
                prop_assert_eq!(store.as_slice(), values.as_slice());
            }

            #[test]
            fn failed_growth_is_all_or_nothing(
                ceiling in 1usize..32,
                extra in 1usize..8,
            ) {
                let config = StoreConfig::new(1).with_max_capacity(ceiling);
                let mut store = GrowableStore::with_config(&config).unwrap();
                for i in 0..ceiling {
                    store.append(i as u64).unwrap();
                }
                let snapshot: Vec<u64> = store.as_slice().to_vec();
                let gen = store.generation();
                let cap = store.capacity();
                for _ in 0..extra {
                    prop_assert!(store.append(0).is_err());
                }
                prop_assert_eq!(store.size(), ceiling);
                prop_assert_eq!(store.capacity(), cap);
                prop_assert_eq!(store.generation(), gen);
                for (i, &v) in snapshot.iter().enumerate() {
                    prop_assert_eq!(store.get(i).unwrap(), v);
                }
            }
        }
    }
}
