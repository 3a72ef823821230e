//! C ABI for dynbuf.
//!
//! Exposes the last-known-value cache, the growable store and the record
//! buffers to C callers through opaque `u64` handles. Every entry point is
//! wrapped in a panic guard; a caught panic returns
//! [`DynbufStatus::Panicked`] and its message can be read back on the same
//! thread with [`dynbuf_last_panic_message`].
//!
//! Objects live in per-type global handle tables behind
//! `Arc<Mutex<_>>`, so concurrent callers are serialised per object and
//! stale or destroyed handles are detected rather than dereferenced.
//!
//! All samples cross the ABI as `f64`; timestamps as `i64`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

use tracing::error;

/// Run `$body` under `catch_unwind`, yielding `$fallback` on panic.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(result) => result,
            Err(payload) => {
                $crate::record_panic(payload);
                $fallback
            }
        }
    };
}

/// Run a status-returning `$body` under `catch_unwind`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::DynbufStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing closure if it
/// is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        ffi_lock!($mutex, $crate::status::DynbufStatus::InternalError as i32)
    };
    ($mutex:expr, $poisoned:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $poisoned,
        }
    };
}

pub mod cache;
mod handle;
pub mod records;
pub mod status;
pub mod store;
pub mod types;

pub use cache::{
    dynbuf_cache_capacity, dynbuf_cache_create, dynbuf_cache_create_with_policy,
    dynbuf_cache_destroy, dynbuf_cache_num_channels, dynbuf_cache_size, dynbuf_cache_snapshot,
    dynbuf_cache_snapshot_view, dynbuf_cache_update, dynbuf_cache_update_at,
    dynbuf_cache_value_of,
};
pub use records::{
    dynbuf_records_add_or_update, dynbuf_records_create, dynbuf_records_delete,
    dynbuf_records_destroy, dynbuf_records_len, dynbuf_records_record_view,
    dynbuf_records_release, dynbuf_records_slice_timestamps, dynbuf_records_slice_view,
};
pub use status::DynbufStatus;
pub use store::{
    dynbuf_store_append, dynbuf_store_capacity, dynbuf_store_create, dynbuf_store_destroy,
    dynbuf_store_generation, dynbuf_store_get, dynbuf_store_set, dynbuf_store_size,
    dynbuf_store_view,
};
pub use types::DynbufView;

thread_local! {
    /// Message of the most recent panic caught on this thread.
    static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Log a caught panic and stash its message for this thread.
pub(crate) fn record_panic(payload: Box<dyn Any + Send>) {
    let message = panic_message(payload.as_ref());
    error!(message = %message, "panic caught at C ABI boundary");
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Copy the message of the last panic caught on this thread into `buf`.
///
/// Returns the full message length in bytes, excluding the terminating
/// NUL, or 0 if no panic has been caught. Pass a null `buf` to query the
/// length. The copy is truncated to `buf_len - 1` bytes and always
/// NUL-terminated when `buf_len > 0`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_last_panic_message(buf: *mut c_char, buf_len: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let message = cell.borrow();
        let bytes = message.as_bytes();
        if !buf.is_null() && buf_len > 0 {
            let n = bytes.len().min(buf_len - 1);
            // SAFETY: buf points to buf_len writable bytes per caller
            // contract, and n + 1 <= buf_len.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
