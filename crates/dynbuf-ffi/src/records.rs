//! Timestamp-keyed record buffers over the C ABI.
//!
//! A record buffer never reallocates after creation, but inserting or
//! evicting rows shifts the rows after them, so a row or slice view is
//! only meaningful until the next mutating call.

use std::sync::{Arc, Mutex};

use dynbuf_series::{RecordBuffer, RowFill};

use crate::handle::HandleTable;
use crate::status::DynbufStatus;
use crate::types::DynbufView;

type RecordsArc = Arc<Mutex<RecordBuffer<f64>>>;

static RECORDS: Mutex<HandleTable<RecordsArc>> = Mutex::new(HandleTable::new());

fn get_records(handle: u64) -> Option<RecordsArc> {
    RECORDS.lock().ok()?.get(handle).cloned()
}

/// Create a record buffer of `n_variables` columns holding up to
/// `3 * window_size` rows.
///
/// New rows start at `fill` in every column, or, when `forward_fill` is
/// non-zero, as a copy of the preceding row (the first row at `fill`).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_create(
    n_variables: usize,
    window_size: usize,
    fill: f64,
    forward_fill: u8,
    records_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if records_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let fill = if forward_fill != 0 {
            RowFill::Forward(fill)
        } else {
            RowFill::Constant(fill)
        };
        let records = match RecordBuffer::new(n_variables, window_size, fill) {
            Ok(r) => r,
            Err(e) => return DynbufStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(RECORDS).insert(Arc::new(Mutex::new(records)));
        // SAFETY: records_out is non-null and valid per caller contract.
        unsafe { *records_out = handle };
        DynbufStatus::Ok as i32
    })
}

/// Destroy a record buffer.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_destroy(records_handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(RECORDS).remove(records_handle) {
            Some(_) => DynbufStatus::Ok as i32,
            None => DynbufStatus::InvalidHandle as i32,
        }
    })
}

/// Write `value` into `column` of the row at `timestamp`, creating the row
/// if needed. Writes 1 to `new_row_out` if a row was created, else 0;
/// `new_row_out` may be null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_add_or_update(
    records_handle: u64,
    timestamp: i64,
    column: usize,
    value: f64,
    new_row_out: *mut u8,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut records = ffi_lock!(arc);
        match records.add_or_update(timestamp, column, value) {
            Ok(new_row) => {
                if !new_row_out.is_null() {
                    // SAFETY: new_row_out is non-null and valid per caller contract.
                    unsafe { *new_row_out = u8::from(new_row) };
                }
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Describe the row at `timestamp` without copying.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_record_view(
    records_handle: u64,
    timestamp: i64,
    view_out: *mut DynbufView,
) -> i32 {
    ffi_guard!({
        if view_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let records = ffi_lock!(arc);
        match records.record_view(timestamp) {
            Ok(view) => {
                // SAFETY: view_out is non-null and valid per caller contract.
                unsafe { *view_out = DynbufView::from_view(&view) };
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Describe up to `n` consecutive rows ending at `timestamp`, row-major,
/// without copying. `view.len` is rows × columns.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_slice_view(
    records_handle: u64,
    timestamp: i64,
    n: usize,
    view_out: *mut DynbufView,
) -> i32 {
    ffi_guard!({
        if view_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let records = ffi_lock!(arc);
        match records.slice_view(timestamp, n) {
            Ok(view) => {
                // SAFETY: view_out is non-null and valid per caller contract.
                unsafe { *view_out = DynbufView::from_view(&view) };
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Copy the timestamps of the rows [`dynbuf_records_slice_view`] would
/// describe into `buf`, writing the count to `n_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_slice_timestamps(
    records_handle: u64,
    timestamp: i64,
    n: usize,
    buf: *mut i64,
    buf_len: usize,
    n_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if buf.is_null() || n_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let records = ffi_lock!(arc);
        let stamps = match records.slice_timestamps(timestamp, n) {
            Ok(s) => s,
            Err(e) => return DynbufStatus::from(&e) as i32,
        };
        if buf_len < stamps.len() {
            return DynbufStatus::BufferTooSmall as i32;
        }
        // SAFETY: buf holds buf_len >= stamps.len() writable i64s; n_out is
        // non-null.
        unsafe {
            std::ptr::copy_nonoverlapping(stamps.as_ptr(), buf, stamps.len());
            *n_out = stamps.len();
        }
        DynbufStatus::Ok as i32
    })
}

/// Decrement the reference counter of each of the `n` listed rows.
/// Unknown timestamps are ignored. `timestamps` may be null when `n == 0`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_release(
    records_handle: u64,
    timestamps: *const i64,
    n: usize,
) -> i32 {
    ffi_guard!({
        if timestamps.is_null() && n > 0 {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let stamps: &[i64] = if n == 0 {
            &[]
        } else {
            // SAFETY: timestamps points to n readable i64s per caller contract.
            unsafe { std::slice::from_raw_parts(timestamps, n) }
        };
        let mut records = ffi_lock!(arc);
        records.release(stamps);
        DynbufStatus::Ok as i32
    })
}

/// Remove the row at `timestamp`; `NotFound` if there is none.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_delete(records_handle: u64, timestamp: i64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut records = ffi_lock!(arc);
        if records.delete(timestamp) {
            DynbufStatus::Ok as i32
        } else {
            DynbufStatus::NotFound as i32
        }
    })
}

/// Number of rows, or a negative status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_records_len(records_handle: u64) -> i64 {
    ffi_guard_or!(DynbufStatus::Panicked as i64, {
        let Some(arc) = get_records(records_handle) else {
            return DynbufStatus::InvalidHandle as i64;
        };
        let records = ffi_lock!(arc, DynbufStatus::InternalError as i64);
        i64::try_from(records.len()).unwrap_or(i64::MAX)
    })
}
