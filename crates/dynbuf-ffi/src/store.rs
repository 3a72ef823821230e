//! Growable store lifecycle, element access and views.

use std::sync::{Arc, Mutex};

use dynbuf_store::{GrowableStore, StoreConfig};

use crate::handle::HandleTable;
use crate::status::DynbufStatus;
use crate::types::DynbufView;

type StoreArc = Arc<Mutex<GrowableStore<f64>>>;

static STORES: Mutex<HandleTable<StoreArc>> = Mutex::new(HandleTable::new());

fn get_store(handle: u64) -> Option<StoreArc> {
    STORES.lock().ok()?.get(handle).cloned()
}

/// Create an empty store with room for `initial_capacity` samples.
///
/// `max_capacity` caps growth; 0 means uncapped. A growth past the cap
/// fails with `AllocationFailed` and leaves the store unchanged.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_create(
    initial_capacity: usize,
    max_capacity: usize,
    store_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if store_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let mut config = StoreConfig::new(initial_capacity);
        if max_capacity > 0 {
            config = config.with_max_capacity(max_capacity);
        }
        let store = match GrowableStore::with_config(&config) {
            Ok(s) => s,
            Err(e) => return DynbufStatus::from(&e) as i32,
        };
        let handle = ffi_lock!(STORES).insert(Arc::new(Mutex::new(store)));
        // SAFETY: store_out is non-null and valid per caller contract.
        unsafe { *store_out = handle };
        DynbufStatus::Ok as i32
    })
}

/// Destroy a store. Views taken from it dangle afterwards.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_destroy(store_handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(STORES).remove(store_handle) {
            Some(_) => DynbufStatus::Ok as i32,
            None => DynbufStatus::InvalidHandle as i32,
        }
    })
}

/// Append `value`, growing if needed. Writes the new element's index to
/// `index_out` unless it is null.
///
/// Growth invalidates every view previously taken from this store.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_append(store_handle: u64, value: f64, index_out: *mut usize) -> i32 {
    ffi_guard!({
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut store = ffi_lock!(arc);
        match store.append(value) {
            Ok(index) => {
                if !index_out.is_null() {
                    // SAFETY: index_out is non-null and valid per caller contract.
                    unsafe { *index_out = index };
                }
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Read the element at `index` into `value_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_get(store_handle: u64, index: usize, value_out: *mut f64) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let store = ffi_lock!(arc);
        match store.get(index) {
            Ok(value) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = value };
                DynbufStatus::Ok as i32
            }
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Overwrite the element at `index`. Never grows.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_set(store_handle: u64, index: usize, value: f64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let mut store = ffi_lock!(arc);
        match store.set(index, value) {
            Ok(()) => DynbufStatus::Ok as i32,
            Err(e) => DynbufStatus::from(&e) as i32,
        }
    })
}

/// Describe the stored elements without copying.
///
/// Compare `view.generation` with [`dynbuf_store_generation`] before
/// dereferencing a view kept across calls.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_view(store_handle: u64, view_out: *mut DynbufView) -> i32 {
    ffi_guard!({
        if view_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let store = ffi_lock!(arc);
        let view = DynbufView::from_view(&store.view());
        // SAFETY: view_out is non-null and valid per caller contract.
        unsafe { *view_out = view };
        DynbufStatus::Ok as i32
    })
}

/// Current storage generation. Incremented by every growth.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_generation(store_handle: u64, generation_out: *mut u64) -> i32 {
    ffi_guard!({
        if generation_out.is_null() {
            return DynbufStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i32;
        };
        let store = ffi_lock!(arc);
        // SAFETY: generation_out is non-null and valid per caller contract.
        unsafe { *generation_out = store.generation().0 };
        DynbufStatus::Ok as i32
    })
}

fn store_property(store_handle: u64, read: fn(&GrowableStore<f64>) -> usize) -> i64 {
    ffi_guard_or!(DynbufStatus::Panicked as i64, {
        let Some(arc) = get_store(store_handle) else {
            return DynbufStatus::InvalidHandle as i64;
        };
        let store = ffi_lock!(arc, DynbufStatus::InternalError as i64);
        i64::try_from(read(&store)).unwrap_or(i64::MAX)
    })
}

/// Allocated capacity in elements, or a negative status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_capacity(store_handle: u64) -> i64 {
    store_property(store_handle, GrowableStore::capacity)
}

/// Number of stored elements, or a negative status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn dynbuf_store_size(store_handle: u64) -> i64 {
    store_property(store_handle, GrowableStore::size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(initial_capacity: usize, max_capacity: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(
            dynbuf_store_create(initial_capacity, max_capacity, &mut h),
            DynbufStatus::Ok as i32
        );
        h
    }

    fn generation(h: u64) -> u64 {
        let mut g = 0u64;
        assert_eq!(dynbuf_store_generation(h, &mut g), DynbufStatus::Ok as i32);
        g
    }

    #[test]
    fn append_grows_past_initial_capacity() {
        let h = create(2, 0);
        for (i, v) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            let mut index = usize::MAX;
            assert_eq!(dynbuf_store_append(h, v, &mut index), DynbufStatus::Ok as i32);
            assert_eq!(index, i);
        }
        assert_eq!(dynbuf_store_size(h), 3);
        assert!(dynbuf_store_capacity(h) >= 3);

        let mut value = 0.0;
        assert_eq!(dynbuf_store_get(h, 2, &mut value), DynbufStatus::Ok as i32);
        assert_eq!(value, 30.0);
        dynbuf_store_destroy(h);
    }

    #[test]
    fn growth_changes_view_generation() {
        let h = create(1, 0);
        dynbuf_store_append(h, 1.0, std::ptr::null_mut());
        let mut before = DynbufView::EMPTY;
        dynbuf_store_view(h, &mut before);
        assert_eq!(before.generation, generation(h));

        dynbuf_store_append(h, 2.0, std::ptr::null_mut());
        let mut after = DynbufView::EMPTY;
        dynbuf_store_view(h, &mut after);

        assert_ne!(before.generation, generation(h));
        assert_eq!(after.generation, generation(h));
        assert_ne!(before.ptr, after.ptr);
        assert_eq!(after.len, 2);
        dynbuf_store_destroy(h);
    }

    #[test]
    fn held_view_stays_current_until_growth() {
        let h = create(2, 0);
        dynbuf_store_append(h, 1.0, std::ptr::null_mut());
        let mut held = DynbufView::EMPTY;
        dynbuf_store_view(h, &mut held);

        assert_eq!(dynbuf_store_set(h, 0, 5.0), DynbufStatus::Ok as i32);
        dynbuf_store_append(h, 2.0, std::ptr::null_mut());
        assert_eq!(held.generation, generation(h));

        dynbuf_store_append(h, 3.0, std::ptr::null_mut());
        assert_ne!(held.generation, generation(h));

        assert_eq!(dynbuf_store_destroy(h), DynbufStatus::Ok as i32);
        let mut after = DynbufView::EMPTY;
        assert_eq!(
            dynbuf_store_view(h, &mut after),
            DynbufStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn capped_store_refuses_growth() {
        let h = create(2, 2);
        dynbuf_store_append(h, 1.0, std::ptr::null_mut());
        dynbuf_store_append(h, 2.0, std::ptr::null_mut());
        assert_eq!(
            dynbuf_store_append(h, 3.0, std::ptr::null_mut()),
            DynbufStatus::AllocationFailed as i32
        );
        assert_eq!(dynbuf_store_size(h), 2);
        assert_eq!(generation(h), 0);
        dynbuf_store_destroy(h);
    }

    #[test]
    fn cap_below_initial_is_config_error() {
        let mut h = 0u64;
        assert_eq!(
            dynbuf_store_create(8, 4, &mut h),
            DynbufStatus::ConfigError as i32
        );
    }

    #[test]
    fn out_of_range_access() {
        let h = create(4, 0);
        let mut value = 0.0;
        assert_eq!(
            dynbuf_store_get(h, 0, &mut value),
            DynbufStatus::OutOfRange as i32
        );
        assert_eq!(dynbuf_store_set(h, 0, 1.0), DynbufStatus::OutOfRange as i32);
        dynbuf_store_append(h, 1.0, std::ptr::null_mut());
        assert_eq!(dynbuf_store_set(h, 0, 5.0), DynbufStatus::Ok as i32);
        assert_eq!(dynbuf_store_get(h, 0, &mut value), DynbufStatus::Ok as i32);
        assert_eq!(value, 5.0);
        dynbuf_store_destroy(h);
    }

    #[test]
    fn destroyed_handle_is_invalid() {
        let h = create(1, 0);
        assert_eq!(dynbuf_store_destroy(h), DynbufStatus::Ok as i32);
        assert_eq!(dynbuf_store_destroy(h), DynbufStatus::InvalidHandle as i32);
        assert_eq!(
            dynbuf_store_append(h, 1.0, std::ptr::null_mut()),
            DynbufStatus::InvalidHandle as i32
        );
        assert_eq!(dynbuf_store_capacity(h), DynbufStatus::InvalidHandle as i64);
    }
}
