//! Last-known-value cache lifecycle, updates and snapshots.
//!
//! Each cache sits behind its own `Arc<Mutex<_>>`; the global `CACHES`
//! table lock is only held for handle lookup, insert and remove.

use std::sync::{Arc, Mutex};

use dynbuf_cache::{CacheConfig, LastKnownValueCache, OrderingPolicy};
use dynbuf_core::ChannelId;

use crate::handle::HandleTable;
use crate::status::DynbufStatus;
use crate::types::DynbufView;

type CacheArc = Arc<Mutex<LastKnownValueCache<f64>>>;

static CACHES: Mutex<HandleTable<CacheArc>> = Mutex::new(HandleTable::new());

fn get_cache(handle: u64) -> Option<CacheArc> {
    CACHES.lock().ok()?.get(handle).cloned()
}

/// Create a cache with `num_channels` channels, all reporting
/// `initial_value` until first updated. Out-of-order timestamps are
/// accepted.
///
/// `initial_capacity` sizes the backing store; 0 uses `num_channels`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_create(
    num_channels: usize,
    initial_capacity: usize,
    initial_value: f64,
    cache_out: *mut u64,
) -> i32 {
    dynbuf_cache_create_with_policy(
        num_channels,
        initial_capacity,
        initial_value,
        OrderingPolicy::AcceptAll as u8,
        cache_out,
    )
}

/// Create a cache with an explicit ordering policy for
/// [`dynbuf_cache_update_at`]: 0 accept all, 1 reject older, 2 reject
/// older or equal.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_create_with_policy(
    num_channels: usize,
    initial_capacity: usize,
    initial_value: f64,
    policy: u8,
    cache_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if cache_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(ordering) = OrderingPolicy::from_u8(policy) else {
            return DynbufStatus::InvalidArgument as i32;
        };

        let mut config = CacheConfig::new(num_channels, initial_value).with_ordering(ordering);
        if initial_capacity > 0 {
            config = config.with_initial_capacity(initial_capacity);
        }
        let cache = match LastKnownValueCache::with_config(&config) {
            Ok(c) => c,
            Err(e) => return DynbufStatus::from(&e) as i32,
        };

        let handle = ffi_lock!(CACHES).insert(Arc::new(Mutex::new(cache)));
        // SAFETY: cache_out is non-null and valid per caller contract.
        unsafe { *cache_out = handle };
        DynbufStatus::Ok as i32
    })
}

/// Destroy a cache. Views taken from it dangle afterwards.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_destroy(cache_handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(CACHES).remove(cache_handle) {
            Some(_) => DynbufStatus::Ok as i32,
            None => DynbufStatus::InvalidHandle as i32,
        }
    })
}

/// Set `channel` to `value`. Writes the channel's new sequence number to
/// `seq_out` unless it is null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_update(
    cache_handle: u64,
    channel: u32,
    value: f64,
    seq_out: *mut u64,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut cache = ffi_lock!(arc);
        match cache.update(ChannelId(channel), value) {
            Ok(seq) => {
                if !seq_out.is_null() {
                    // SAFETY: seq_out is non-null and valid per caller contract.
                    unsafe { *seq_out = seq.0 };
                }
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Set `channel` to `value` as of `timestamp`, subject to the cache's
/// ordering policy. A rejected update returns `StaleUpdate` and leaves the
/// cache unchanged.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_update_at(
    cache_handle: u64,
    channel: u32,
    value: f64,
    timestamp: i64,
    seq_out: *mut u64,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut cache = ffi_lock!(arc);
        match cache.update_at(ChannelId(channel), value, timestamp) {
            Ok(seq) => {
                if !seq_out.is_null() {
                    // SAFETY: seq_out is non-null and valid per caller contract.
                    unsafe { *seq_out = seq.0 };
                }
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Read one channel. `value_out` is required; `seq_out` may be null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_value_of(
    cache_handle: u64,
    channel: u32,
    value_out: *mut f64,
    seq_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let cache = ffi_lock!(arc);
        match cache.value_of(ChannelId(channel)) {
            Ok((value, seq)) => {
                // SAFETY: value_out is non-null; seq_out checked below.
                unsafe {
                    *value_out = value;
                    if !seq_out.is_null() {
                        *seq_out = seq.0;
                    }
                }
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Copy every channel's value, in channel order, into `buf`.
///
/// `buf_len` must be at least the channel count.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_snapshot(cache_handle: u64, buf: *mut f64, buf_len: usize) -> i32 {
    ffi_guard!({
        if buf.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let cache = ffi_lock!(arc);
        let values = cache.snapshot_slice();
        if buf_len < values.len() {
            return DynbufStatus::BufferTooSmall as i32;
        }
        // SAFETY: buf points to buf_len >= values.len() writable f64s.
        unsafe { std::ptr::copy_nonoverlapping(values.as_ptr(), buf, values.len()) };
        DynbufStatus::Ok as i32
    })
}

/// Describe the cache's dense value array without copying.
///
/// The cache never grows after creation, so the view stays valid until
/// [`dynbuf_cache_destroy`]. Its contents change with every update.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_snapshot_view(cache_handle: u64, view_out: *mut DynbufView) -> i32 {
    ffi_guard!({
        if view_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let cache = ffi_lock!(arc);
        let view = DynbufView::from_view(&cache.snapshot_view());
        // SAFETY: view_out is non-null and valid per caller contract.
        unsafe { *view_out = view };
        DynbufStatus::Ok as i32
    })
}

/// Read one `usize` property of a cache as `i64`, or a negative status.
fn cache_property(cache_handle: u64, read: fn(&LastKnownValueCache<f64>) -> usize) -> i64 {
    ffi_guard_or!(DynbufStatus::Panicked as i64, {
        let Some(arc) = get_cache(cache_handle) else {
            return DynbufStatus::InvalidHandle as i64;
        };
        let cache = ffi_lock!(arc, DynbufStatus::InternalError as i64);
        i64::try_from(read(&cache)).unwrap_or(i64::MAX)
    })
}

/// Backing store capacity in samples, or a negative status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_capacity(cache_handle: u64) -> i64 {
    cache_property(cache_handle, LastKnownValueCache::capacity)
}

/// Number of stored slots (equal to the channel count), or a negative
/// status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_size(cache_handle: u64) -> i64 {
    cache_property(cache_handle, LastKnownValueCache::size)
}

/// Channel count, or a negative status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_cache_num_channels(cache_handle: u64) -> i64 {
    cache_property(cache_handle, LastKnownValueCache::num_channels)
}
