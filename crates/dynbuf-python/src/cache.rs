//! LastKnownValues: Python wrapper around the last-known-value cache FFI.
//!
//! FFI calls release the GIL via `py.detach()`; the native cache is
//! guarded by its own mutex.

use numpy::PyArray1;
use pyo3::prelude::*;

use dynbuf_ffi::{
    dynbuf_cache_capacity, dynbuf_cache_create_with_policy, dynbuf_cache_destroy,
    dynbuf_cache_snapshot, dynbuf_cache_snapshot_view, dynbuf_cache_update,
    dynbuf_cache_update_at, dynbuf_cache_value_of, DynbufView,
};

use crate::error::{check_count, check_status};
use crate::view::borrowed_array;

/// How `update_at` treats a timestamp older than the channel's last one.
#[pyclass(eq, eq_int, from_py_object)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OrderingPolicy {
    /// Every update overwrites.
    AcceptAll = 0,
    /// Strictly older timestamps raise ValueError; equal ones overwrite.
    RejectOlder = 1,
    /// Older or equal timestamps raise ValueError.
    RejectOlderOrEqual = 2,
}

/// Fixed set of numbered channels, each holding its most recent value.
///
/// Channels never updated report `initial_value`. `snapshot()` returns a
/// copy; `snapshot_view()` returns a read-only array over the live values
/// that tracks later updates and stays valid until `destroy()`.
#[pyclass]
pub(crate) struct LastKnownValues {
    handle: Option<u64>,
    num_channels: usize,
}

#[pymethods]
impl LastKnownValues {
    #[new]
    #[pyo3(signature = (num_channels, initial_value=f64::NAN, initial_capacity=0, policy=OrderingPolicy::AcceptAll))]
    fn new(
        py: Python<'_>,
        num_channels: usize,
        initial_value: f64,
        initial_capacity: usize,
        policy: OrderingPolicy,
    ) -> PyResult<Self> {
        let (status, handle) = py.detach(|| {
            let mut h: u64 = 0;
            let s = dynbuf_cache_create_with_policy(
                num_channels,
                initial_capacity,
                initial_value,
                policy as u8,
                &mut h,
            );
            (s, h)
        });
        check_status(status)?;
        Ok(LastKnownValues {
            handle: Some(handle),
            num_channels,
        })
    }

    /// Set a channel's value. Returns the channel's new sequence number.
    fn update(&self, py: Python<'_>, channel: u32, value: f64) -> PyResult<u64> {
        let h = self.require_handle()?;
        let (status, seq) = py.detach(|| {
            let mut seq: u64 = 0;
            let s = dynbuf_cache_update(h, channel, value, &mut seq);
            (s, seq)
        });
        check_status(status)?;
        Ok(seq)
    }

    /// Set a channel's value as of `timestamp`, subject to the ordering
    /// policy.
    ///
    /// Raises:
    ///     ValueError: If the policy rejects the timestamp.
    fn update_at(&self, py: Python<'_>, channel: u32, value: f64, timestamp: i64) -> PyResult<u64> {
        let h = self.require_handle()?;
        let (status, seq) = py.detach(|| {
            let mut seq: u64 = 0;
            let s = dynbuf_cache_update_at(h, channel, value, timestamp, &mut seq);
            (s, seq)
        });
        check_status(status)?;
        Ok(seq)
    }

    /// Current `(value, sequence)` of one channel.
    fn value_of(&self, py: Python<'_>, channel: u32) -> PyResult<(f64, u64)> {
        let h = self.require_handle()?;
        let (status, value, seq) = py.detach(|| {
            let (mut value, mut seq) = (0.0f64, 0u64);
            let s = dynbuf_cache_value_of(h, channel, &mut value, &mut seq);
            (s, value, seq)
        });
        check_status(status)?;
        Ok((value, seq))
    }

    /// Copy of every channel's value, in channel order.
    fn snapshot<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let h = self.require_handle()?;
        let n = self.num_channels;
        let mut buf = vec![0.0f64; n];
        let buf_addr = buf.as_mut_ptr() as usize;
        let status = py.detach(|| dynbuf_cache_snapshot(h, buf_addr as *mut f64, n));
        check_status(status)?;
        Ok(PyArray1::from_vec(py, buf))
    }

    /// Read-only zero-copy array over the live channel values.
    ///
    /// Reflects later updates in place. The array keeps this object alive,
    /// not its storage: after `destroy()` or leaving a `with` block it
    /// reads freed memory and must not be used.
    fn snapshot_view<'py>(slf: &Bound<'py, Self>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let h = slf.borrow().require_handle()?;
        let mut view = DynbufView::EMPTY;
        let view_addr = &mut view as *mut DynbufView as usize;
        let status = slf
            .py()
            .detach(|| dynbuf_cache_snapshot_view(h, view_addr as *mut DynbufView));
        check_status(status)?;
        borrowed_array(slf.as_any(), &view)
    }

    /// Number of channels.
    #[getter]
    fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Capacity of the backing store, in values.
    #[getter]
    fn capacity(&self, py: Python<'_>) -> PyResult<usize> {
        let h = self.require_handle()?;
        check_count(py.detach(|| dynbuf_cache_capacity(h)))
    }

    fn __len__(&self) -> usize {
        self.num_channels
    }

    /// Explicitly destroy the native cache.
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

impl LastKnownValues {
    fn require_handle(&self) -> PyResult<u64> {
        self.handle.ok_or_else(|| {
            pyo3::exceptions::PyRuntimeError::new_err("LastKnownValues already destroyed")
        })
    }

    fn do_destroy_with_gil(&mut self, py: Python<'_>) {
        if let Some(h) = self.handle.take() {
            py.detach(|| dynbuf_cache_destroy(h));
        }
    }
}

impl Drop for LastKnownValues {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            Python::attach(|py| {
                py.detach(|| dynbuf_cache_destroy(h));
            });
        }
    }
}
