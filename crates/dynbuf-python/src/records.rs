//! DynamicBuffer: Python wrapper around the record buffer FFI.

use numpy::PyArray2;
use pyo3::prelude::*;

use dynbuf_ffi::{
    dynbuf_records_add_or_update, dynbuf_records_create, dynbuf_records_delete,
    dynbuf_records_destroy, dynbuf_records_len, dynbuf_records_record_view,
    dynbuf_records_release, dynbuf_records_slice_timestamps, dynbuf_records_slice_view,
    DynbufView,
};

use crate::error::{check_count, check_status};
use crate::view::{borrowed_rows, copied_rows};

/// Rows of `n_variables` floats keyed by integer timestamp, kept sorted.
///
/// Holds up to `3 * window_size` rows. Each write bumps the row's
/// reference count and `release()` lowers it; when full, the oldest fully
/// released rows are evicted to make room. With `forward_fill=True` a new
/// row starts as a copy of the row before it.
#[pyclass]
pub(crate) struct DynamicBuffer {
    handle: Option<u64>,
    n_variables: usize,
}

#[pymethods]
impl DynamicBuffer {
    #[new]
    #[pyo3(signature = (n_variables, window_size, fill=f64::NAN, forward_fill=false))]
    fn new(
        py: Python<'_>,
        n_variables: usize,
        window_size: usize,
        fill: f64,
        forward_fill: bool,
    ) -> PyResult<Self> {
        let (status, handle) = py.detach(|| {
            let mut h: u64 = 0;
            let s = dynbuf_records_create(
                n_variables,
                window_size,
                fill,
                u8::from(forward_fill),
                &mut h,
            );
            (s, h)
        });
        check_status(status)?;
        Ok(DynamicBuffer {
            handle: Some(handle),
            n_variables,
        })
    }

    /// Write `value` into `column` of the row at `timestamp`. Returns True
    /// when the row was created by this call.
    ///
    /// Raises:
    ///     IndexError: If `column` is out of range.
    ///     RuntimeError: If the buffer is full and nothing can be evicted.
    fn add_or_update(&self, py: Python<'_>, timestamp: i64, column: usize, value: f64) -> PyResult<bool> {
        let h = self.require_handle()?;
        let (status, new_row) = py.detach(|| {
            let mut new_row: u8 = 0;
            let s = dynbuf_records_add_or_update(h, timestamp, column, value, &mut new_row);
            (s, new_row)
        });
        check_status(status)?;
        Ok(new_row != 0)
    }

    /// Copy of the row at `timestamp`, shape `(1, n_variables)`.
    ///
    /// Raises:
    ///     KeyError: If no row exists at `timestamp`.
    fn record<'py>(&self, py: Python<'py>, timestamp: i64) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let h = self.require_handle()?;
        // GIL held from view to copy.
        let mut view = DynbufView::EMPTY;
        check_status(dynbuf_records_record_view(h, timestamp, &mut view))?;
        copied_rows(py, &view, self.n_variables)
    }

    /// Copy of up to `n` rows ending at `timestamp`, shape
    /// `(rows, n_variables)`.
    fn slice<'py>(&self, py: Python<'py>, timestamp: i64, n: usize) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let h = self.require_handle()?;
        let mut view = DynbufView::EMPTY;
        check_status(dynbuf_records_slice_view(h, timestamp, n, &mut view))?;
        copied_rows(py, &view, self.n_variables)
    }

    /// Read-only zero-copy array over up to `n` rows ending at `timestamp`.
    ///
    /// Valid until the next call that adds, deletes or evicts rows: those
    /// shift rows under the view, so it may then show other timestamps.
    /// The array keeps this object alive, not its storage; after
    /// `destroy()` it reads freed memory and must not be used. Use
    /// `slice()` for a copy that stays valid.
    fn slice_view<'py>(slf: &Bound<'py, Self>, timestamp: i64, n: usize) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let (h, cols) = {
            let this = slf.borrow();
            (this.require_handle()?, this.n_variables)
        };
        let mut view = DynbufView::EMPTY;
        let view_addr = &mut view as *mut DynbufView as usize;
        let status = slf
            .py()
            .detach(|| dynbuf_records_slice_view(h, timestamp, n, view_addr as *mut DynbufView));
        check_status(status)?;
        borrowed_rows(slf.as_any(), &view, cols)
    }

    /// Timestamps of the rows `slice(timestamp, n)` returns.
    fn slice_timestamps(&self, py: Python<'_>, timestamp: i64, n: usize) -> PyResult<Vec<i64>> {
        let h = self.require_handle()?;
        let rows = n.min(self.__len__(py)?);
        let mut buf = vec![0i64; rows];
        let buf_addr = buf.as_mut_ptr() as usize;
        let (status, written) = py.detach(|| {
            let mut written: usize = 0;
            let s = dynbuf_records_slice_timestamps(
                h,
                timestamp,
                n,
                buf_addr as *mut i64,
                rows,
                &mut written,
            );
            (s, written)
        });
        check_status(status)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Lower the reference count of each listed row. Unknown timestamps
    /// are ignored.
    fn release(&self, py: Python<'_>, timestamps: Vec<i64>) -> PyResult<()> {
        let h = self.require_handle()?;
        let addr = timestamps.as_ptr() as usize;
        let n = timestamps.len();
        check_status(py.detach(|| dynbuf_records_release(h, addr as *const i64, n)))
    }

    /// Remove the row at `timestamp`. Returns False if there was none.
    fn delete(&self, py: Python<'_>, timestamp: i64) -> PyResult<bool> {
        let h = self.require_handle()?;
        match py.detach(|| dynbuf_records_delete(h, timestamp)) {
            -9 => Ok(false),
            status => check_status(status).map(|()| true),
        }
    }

    /// Columns per row.
    #[getter]
    fn n_variables(&self) -> usize {
        self.n_variables
    }

    fn __len__(&self, py: Python<'_>) -> PyResult<usize> {
        let h = self.require_handle()?;
        check_count(py.detach(|| dynbuf_records_len(h)))
    }

    /// Explicitly destroy the native buffer.
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

impl DynamicBuffer {
    fn require_handle(&self) -> PyResult<u64> {
        self.handle.ok_or_else(|| {
            pyo3::exceptions::PyRuntimeError::new_err("DynamicBuffer already destroyed")
        })
    }

    fn do_destroy_with_gil(&mut self, py: Python<'_>) {
        if let Some(h) = self.handle.take() {
            py.detach(|| dynbuf_records_destroy(h));
        }
    }
}

impl Drop for DynamicBuffer {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            Python::attach(|py| {
                py.detach(|| dynbuf_records_destroy(h));
            });
        }
    }
}
