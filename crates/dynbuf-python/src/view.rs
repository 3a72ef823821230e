//! Zero-copy NumPy arrays over FFI views.
//!
//! The arrays returned here borrow memory owned by a native dynbuf object.
//! Their NumPy `base` is the Python wrapper, so the wrapper outlives every
//! array. They are marked read-only. Calling `.destroy()` on the wrapper,
//! or growing it, still invalidates them: that is the documented view
//! contract, not something NumPy can track.

use numpy::ndarray::{ArrayView1, ArrayView2};
use numpy::{PyArray1, PyArray2, PyArrayMethods};
use pyo3::prelude::*;

use dynbuf_ffi::DynbufView;

fn to_usize(n: u64) -> PyResult<usize> {
    usize::try_from(n).map_err(|e| pyo3::exceptions::PyOverflowError::new_err(e.to_string()))
}

fn freeze<T: numpy::Element, D: numpy::ndarray::Dimension>(
    array: &Bound<'_, numpy::PyArray<T, D>>,
) -> PyResult<()> {
    array.getattr("flags")?.setattr("writeable", false)
}

/// Wrap a view as a read-only 1-D `float64` array kept alive by `owner`.
#[allow(unsafe_code)]
pub(crate) fn borrowed_array<'py>(
    owner: &Bound<'py, PyAny>,
    view: &DynbufView,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let len = to_usize(view.len)?;
    if len == 0 {
        return Ok(PyArray1::from_slice(owner.py(), &[]));
    }
    // SAFETY: the view describes `len` initialised, aligned f64s owned by
    // the native object behind `owner`; the array holds `owner` as its base.
    let array = unsafe {
        let data = ArrayView1::from_shape_ptr(len, view.ptr);
        PyArray1::borrow_from_array(&data, owner.clone())
    };
    freeze(&array)?;
    Ok(array)
}

/// Wrap a row-major view of `cols`-wide rows as a read-only 2-D array.
#[allow(unsafe_code)]
pub(crate) fn borrowed_rows<'py>(
    owner: &Bound<'py, PyAny>,
    view: &DynbufView,
    cols: usize,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let len = to_usize(view.len)?;
    if len == 0 || cols == 0 {
        return Ok(PyArray2::zeros(owner.py(), [0, cols], false));
    }
    let rows = len / cols;
    // SAFETY: as in `borrowed_array`; `rows * cols == len` because views
    // cover whole rows.
    let array = unsafe {
        let data = ArrayView2::from_shape_ptr((rows, cols), view.ptr);
        PyArray2::borrow_from_array(&data, owner.clone())
    };
    freeze(&array)?;
    Ok(array)
}

/// Copy a view into a new 2-D array.
#[allow(unsafe_code)]
pub(crate) fn copied_rows<'py>(
    py: Python<'py>,
    view: &DynbufView,
    cols: usize,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let len = to_usize(view.len)?;
    if len == 0 || cols == 0 {
        return Ok(PyArray2::zeros(py, [0, cols], false));
    }
    // SAFETY: see `borrowed_array`; the caller holds the GIL from taking
    // the view until this copy completes, so no other Python thread can
    // mutate the owner in between.
    let slice = unsafe { std::slice::from_raw_parts(view.ptr, len) };
    PyArray1::from_slice(py, slice).reshape([len / cols, cols])
}
