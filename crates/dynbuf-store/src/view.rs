//! Non-owning projections of a store's memory.
//!
//! A [`BufferView`] is the `(address, length, stride)` triple a host array
//! library needs to wrap the store without copying, tagged with the
//! store generation it was taken at. It holds no borrow, so it can be
//! handed across a foreign boundary; the price is that validity is a
//! documented precondition rather than a compile-time guarantee.

use std::fmt;

use dynbuf_core::{Generation, Sample};

use crate::store::GrowableStore;

/// Read-only, non-owning view of contiguous samples.
///
/// Valid until the originating store moves to a new allocation (any
/// growth, explicit or triggered by an append) or is dropped. Use
/// [`is_current`](Self::is_current) to assert validity before reading.
#[derive(Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct BufferView<T> {
    pub(crate) ptr: *const T,
    pub(crate) len: usize,
    pub(crate) generation: Generation,
}

impl<T: Sample> BufferView<T> {
    pub(crate) fn new(ptr: *const T, len: usize, generation: Generation) -> Self {
        Self {
            ptr,
            len,
            generation,
        }
    }

    /// Address of the first sample.
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view covers no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between consecutive samples, in bytes.
    pub fn stride(&self) -> usize {
        T::WIDTH
    }

    /// Total bytes covered.
    pub fn byte_len(&self) -> usize {
        self.len * T::WIDTH
    }

    /// Store generation at acquisition.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether `store` has not moved since this view was taken.
    ///
    /// Only meaningful for the store the view came from.
    pub fn is_current(&self, store: &GrowableStore<T>) -> bool {
        self.generation == store.generation()
    }
}

impl<T: Sample> fmt::Debug for BufferView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BufferView<{}>(ptr={:p}, len={}, stride={}, gen={})",
            T::TYPE_NAME,
            self.ptr,
            self.len,
            T::WIDTH,
            self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_reports_size_and_stride() {
        let mut store = GrowableStore::new(4);
        store.extend_from_slice(&[1.0f64, 2.0, 3.0]).unwrap();
        let view = store.view();
        assert_eq!(view.len(), 3);
        assert_eq!(view.stride(), 8);
        assert_eq!(view.byte_len(), 24);
        assert_eq!(view.as_ptr(), store.as_slice().as_ptr());
        assert!(view.is_current(&store));
    }

    #[test]
    fn in_place_writes_keep_view_current() {
        let mut store = GrowableStore::new(4);
        store.append(1.0f32).unwrap();
        let view = store.view();
        store.set(0, 9.0).unwrap();
        store.append(2.0).unwrap();
        assert!(view.is_current(&store));
        assert_eq!(view.as_ptr(), store.as_slice().as_ptr());
    }

    #[test]
    fn growth_invalidates_view() {
        let mut store = GrowableStore::new(1);
        store.append(1i64).unwrap();
        let before = store.view();
        store.append(2).unwrap();
        let after = store.view();
        assert!(!before.is_current(&store));
        assert!(after.is_current(&store));
        assert_ne!(before.generation(), after.generation());
        assert_ne!(before.as_ptr(), after.as_ptr());
    }

    #[test]
    fn range_view_points_into_store() {
        let mut store = GrowableStore::new(8);
        store.extend_from_slice(&[0u32, 1, 2, 3, 4]).unwrap();
        let view = store.view_range(1..4).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.as_ptr(), store.as_slice()[1..].as_ptr());
        assert!(store.view_range(3..9).is_err());
    }

    #[test]
    fn empty_store_view() {
        let store: GrowableStore<f64> = GrowableStore::new(0);
        let view = store.view();
        assert!(view.is_empty());
        assert_eq!(view.byte_len(), 0);
    }
}
