//! Reconstructing slices from raw views.
//!
//! The only `unsafe` in this crate. Everything else works on `Vec<T>` and
//! safe slices.

#![allow(unsafe_code)]

use dynbuf_core::Sample;

use crate::view::BufferView;

impl<T: Sample> BufferView<T> {
    /// Reinterpret the view as a slice.
    ///
    /// # Safety
    ///
    /// The originating store must still be alive and at the generation
    /// recorded in this view (see [`BufferView::is_current`]), and must not
    /// be mutated while the returned slice is in use. The lifetime `'a` is
    /// unconstrained; the caller picks one that respects these rules.
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        // SAFETY: ptr came from a live Vec<T> allocation with at least
        // `len` initialised elements (or is the Vec's dangling pointer when
        // len == 0); the caller guarantees that allocation is still the
        // current one and is not being written.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}
