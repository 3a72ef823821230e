//! `repr(C)` types shared across the ABI.

use dynbuf_store::BufferView;

/// Zero-copy description of a run of `f64` samples owned by a dynbuf
/// object.
///
/// Valid only while the owning object is alive and its generation equals
/// `generation`. Any growth of the owner moves its storage; re-acquire the
/// view after every call that may grow.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DynbufView {
    /// Address of the first sample. May dangle when `len == 0`.
    pub ptr: *const f64,
    /// Number of samples.
    pub len: u64,
    /// Bytes between consecutive samples.
    pub stride: u64,
    /// Owner's storage generation when the view was taken.
    pub generation: u64,
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<DynbufView>() == 32);
const _: () = assert!(std::mem::align_of::<DynbufView>() == 8);

impl DynbufView {
    /// A view of nothing.
    pub const EMPTY: Self = Self {
        ptr: std::ptr::null(),
        len: 0,
        stride: 0,
        generation: 0,
    };

    pub(crate) fn from_view(view: &BufferView<f64>) -> Self {
        Self {
            ptr: view.as_ptr(),
            len: view.len() as u64,
            stride: view.stride() as u64,
            generation: view.generation().0,
        }
    }
}

impl Default for DynbufView {
    fn default() -> Self {
        Self::EMPTY
    }
}
