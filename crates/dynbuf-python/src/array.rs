//! DynamicArray: Python wrapper around the growable store FFI.

use numpy::PyArray1;
use pyo3::prelude::*;

use dynbuf_ffi::{
    dynbuf_store_append, dynbuf_store_capacity, dynbuf_store_create, dynbuf_store_destroy,
    dynbuf_store_generation, dynbuf_store_get, dynbuf_store_set, dynbuf_store_size,
    dynbuf_store_view, DynbufView,
};

use crate::error::{check_count, check_status};
use crate::view::borrowed_array;

/// Growable contiguous array of floats.
///
/// `view()` returns a read-only zero-copy array. Any `append` that grows
/// the array moves its storage and invalidates earlier views; compare
/// `generation` before reusing one. `to_numpy()` always copies.
#[pyclass]
pub(crate) struct DynamicArray {
    handle: Option<u64>,
}

#[pymethods]
impl DynamicArray {
    #[new]
    #[pyo3(signature = (initial_capacity=16, max_capacity=0))]
    fn new(py: Python<'_>, initial_capacity: usize, max_capacity: usize) -> PyResult<Self> {
        let (status, handle) = py.detach(|| {
            let mut h: u64 = 0;
            let s = dynbuf_store_create(initial_capacity, max_capacity, &mut h);
            (s, h)
        });
        check_status(status)?;
        Ok(DynamicArray {
            handle: Some(handle),
        })
    }

    /// Append a value. Returns its index.
    ///
    /// Raises:
    ///     MemoryError: If growth fails; the array is unchanged.
    fn append(&self, py: Python<'_>, value: f64) -> PyResult<usize> {
        let h = self.require_handle()?;
        let (status, index) = py.detach(|| {
            let mut index: usize = 0;
            let s = dynbuf_store_append(h, value, &mut index);
            (s, index)
        });
        check_status(status)?;
        Ok(index)
    }

    /// Append every value in order.
    fn extend(&self, py: Python<'_>, values: Vec<f64>) -> PyResult<()> {
        let h = self.require_handle()?;
        let status = py.detach(|| {
            for v in values {
                let s = dynbuf_store_append(h, v, std::ptr::null_mut());
                if s != 0 {
                    return s;
                }
            }
            0
        });
        check_status(status)
    }

    fn __getitem__(&self, py: Python<'_>, index: isize) -> PyResult<f64> {
        let h = self.require_handle()?;
        let index = self.resolve_index(py, index)?;
        let (status, value) = py.detach(|| {
            let mut value = 0.0f64;
            let s = dynbuf_store_get(h, index, &mut value);
            (s, value)
        });
        check_status(status)?;
        Ok(value)
    }

    fn __setitem__(&self, py: Python<'_>, index: isize, value: f64) -> PyResult<()> {
        let h = self.require_handle()?;
        let index = self.resolve_index(py, index)?;
        check_status(py.detach(|| dynbuf_store_set(h, index, value)))
    }

    fn __len__(&self, py: Python<'_>) -> PyResult<usize> {
        let h = self.require_handle()?;
        check_count(py.detach(|| dynbuf_store_size(h)))
    }

    /// Read-only zero-copy array over the current contents.
    ///
    /// The array keeps this object alive, not its storage. An `append`
    /// that grows the array, or `destroy()`, frees the memory the view
    /// reads: compare `generation` against its value when the view was
    /// taken, and take a fresh view (or use `to_numpy()`) if it changed.
    fn view<'py>(slf: &Bound<'py, Self>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let h = slf.borrow().require_handle()?;
        let mut view = DynbufView::EMPTY;
        let view_addr = &mut view as *mut DynbufView as usize;
        let status = slf
            .py()
            .detach(|| dynbuf_store_view(h, view_addr as *mut DynbufView));
        check_status(status)?;
        borrowed_array(slf.as_any(), &view)
    }

    /// Copy of the current contents.
    #[allow(unsafe_code)]
    fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let h = self.require_handle()?;
        // GIL held from view to copy: no other Python thread can grow the
        // array in between.
        let mut view = DynbufView::EMPTY;
        check_status(dynbuf_store_view(h, &mut view))?;
        if view.len == 0 {
            return Ok(PyArray1::from_slice(py, &[]));
        }
        // SAFETY: the view is current; see above.
        let data = unsafe { std::slice::from_raw_parts(view.ptr, view.len as usize) };
        Ok(PyArray1::from_slice(py, data))
    }

    /// Storage generation; changes whenever growth moves the data.
    #[getter]
    fn generation(&self, py: Python<'_>) -> PyResult<u64> {
        let h = self.require_handle()?;
        let (status, generation) = py.detach(|| {
            let mut g: u64 = 0;
            let s = dynbuf_store_generation(h, &mut g);
            (s, g)
        });
        check_status(status)?;
        Ok(generation)
    }

    /// Allocated capacity, in values.
    #[getter]
    fn capacity(&self, py: Python<'_>) -> PyResult<usize> {
        let h = self.require_handle()?;
        check_count(py.detach(|| dynbuf_store_capacity(h)))
    }

    /// Explicitly destroy the native array.
    fn destroy(&mut self, py: Python<'_>) {
        self.do_destroy_with_gil(py);
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &mut self,
        py: Python<'_>,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_val: Option<&Bound<'_, PyAny>>,
        _exc_tb: Option<&Bound<'_, PyAny>>,
    ) {
        self.do_destroy_with_gil(py);
    }
}

impl DynamicArray {
    fn require_handle(&self) -> PyResult<u64> {
        self.handle.ok_or_else(|| {
            pyo3::exceptions::PyRuntimeError::new_err("DynamicArray already destroyed")
        })
    }

    /// Map a possibly negative Python index onto `0..len`.
    fn resolve_index(&self, py: Python<'_>, index: isize) -> PyResult<usize> {
        if index >= 0 {
            return Ok(index as usize);
        }
        let len = self.__len__(py)?;
        len.checked_sub(index.unsigned_abs()).ok_or_else(|| {
            pyo3::exceptions::PyIndexError::new_err(format!(
                "index {index} out of range for length {len}"
            ))
        })
    }

    fn do_destroy_with_gil(&mut self, py: Python<'_>) {
        if let Some(h) = self.handle.take() {
            py.detach(|| dynbuf_store_destroy(h));
        }
    }
}

impl Drop for DynamicArray {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            Python::attach(|py| {
                py.detach(|| dynbuf_store_destroy(h));
            });
        }
    }
}
