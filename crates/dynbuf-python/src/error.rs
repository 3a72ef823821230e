//! DynbufStatus -> Python exception mapping with recovery hints.

use std::ffi::c_char;

use dynbuf_ffi::dynbuf_last_panic_message;
use pyo3::exceptions::{PyIndexError, PyKeyError, PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::PyResult;

/// Check an FFI status code. Returns `Ok(())` on success, raises a typed
/// Python exception with a recovery hint on error.
pub(crate) fn check_status(code: i32) -> PyResult<()> {
    if code == 0 {
        return Ok(());
    }
    let (msg, hint) = error_detail(code);
    let mut full = format!("dynbuf error {code}: {msg}\n  Hint: {hint}");
    if code == -128 {
        let panic = last_panic_message();
        if !panic.is_empty() {
            full.push_str("\n  Panic: ");
            full.push_str(&panic);
        }
    }
    match code {
        // Bad channel, column or element index → IndexError
        -2 | -3 => Err(PyIndexError::new_err(full)),

        // Missing timestamp → KeyError
        -9 => Err(PyKeyError::new_err(full)),

        // Growth failure → MemoryError
        -4 => Err(PyMemoryError::new_err(full)),

        // Caller-correctable arguments → ValueError
        -8..=-5 => Err(PyValueError::new_err(full)),

        // Everything else → RuntimeError
        _ => Err(PyRuntimeError::new_err(full)),
    }
}

/// Convert an `i64` count returned by the FFI into `usize`, raising for
/// negative status codes.
pub(crate) fn check_count(value: i64) -> PyResult<usize> {
    if value < 0 {
        check_status(i32::try_from(value).unwrap_or(i32::MIN))?;
    }
    usize::try_from(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Message of the last panic caught by the FFI on this thread.
fn last_panic_message() -> String {
    let len = dynbuf_last_panic_message(std::ptr::null_mut(), 0);
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize + 1];
    dynbuf_last_panic_message(buf.as_mut_ptr().cast::<c_char>(), buf.len());
    buf.truncate(len as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Returns `(message, recovery_hint)` for each FFI status code.
fn error_detail(code: i32) -> (&'static str, &'static str) {
    match code {
        -1 => (
            "invalid handle (already destroyed?)",
            "The object has been destroyed. Don't call .destroy() and then \
             continue using it. If using a context manager, access is only \
             valid inside the `with` block.",
        ),
        -2 => (
            "channel or column index out of range",
            "Channel indices run from 0 to num_channels - 1 and column \
             indices from 0 to n_variables - 1, both fixed at construction.",
        ),
        -3 => (
            "element index out of range",
            "Indices run from 0 to len(array) - 1. Append before reading or \
             writing a new position.",
        ),
        -4 => (
            "growth failed (allocation refused or capacity ceiling reached)",
            "The buffer is unchanged. Raise max_capacity, or drain the buffer \
             before appending more.",
        ),
        -5 => (
            "stale timestamped update rejected by ordering policy",
            "The update's timestamp is older than the channel's last one. \
             Use OrderingPolicy.AcceptAll to keep every update, or drop \
             late samples upstream.",
        ),
        -6 => (
            "invalid construction parameters",
            "num_channels, n_variables and window_size must be at least 1, \
             and max_capacity must be 0 or at least initial_capacity.",
        ),
        -7 => (
            "invalid argument",
            "An argument was out of its accepted range. This usually \
             indicates a bug in the bindings; please report it.",
        ),
        -8 => (
            "output buffer too small",
            "The destination must hold at least as many elements as the \
             source. This usually indicates a bug in the bindings.",
        ),
        -9 => (
            "no record at this timestamp",
            "Check buffer.timestamps() for the rows currently held. Rows are \
             evicted from the front once released.",
        ),
        -10 => (
            "record buffer full",
            "Every row is still referenced. Call release() for rows you are \
             done with so they can be evicted, or use a larger window_size.",
        ),
        -20 => (
            "internal error (poisoned lock after an earlier panic)",
            "A previous call panicked while holding this object's lock. \
             Destroy the object and create a new one.",
        ),
        -128 => (
            "panic in native code",
            "This is a bug in dynbuf. Please report it with the panic \
             message below.",
        ),
        _ => (
            "unknown error code",
            "This may indicate a version mismatch between the Python \
             bindings and the native library.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_known_codes_have_detail() {
        for code in (-10..=-1).chain([-20, -128]) {
            let (msg, hint) = error_detail(code);
            assert!(!msg.is_empty(), "code {code} has empty msg");
            assert!(!hint.is_empty(), "code {code} has empty hint");
            assert!(!msg.contains("unknown"), "code {code} not mapped");
        }
    }

    #[test]
    fn unknown_code_returns_fallback() {
        let (msg, hint) = error_detail(-999);
        assert!(msg.contains("unknown"));
        assert!(hint.contains("version mismatch"));
    }

    #[test]
    fn no_panic_means_empty_message() {
        assert!(last_panic_message().is_empty());
    }
}
