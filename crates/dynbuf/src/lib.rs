//! dynbuf: growable contiguous numeric buffers with zero-copy views.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all dynbuf sub-crates. For most users, adding `dynbuf` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use dynbuf::prelude::*;
//!
//! // Three telemetry channels, all starting at 0.0.
//! let mut cache = LastKnownValueCache::new(3, 0.0f64).unwrap();
//! cache.update(ChannelId(1), 42.0).unwrap();
//! assert_eq!(cache.snapshot(), vec![0.0, 42.0, 0.0]);
//!
//! // A growable store: views are tied to the storage generation.
//! let mut store: GrowableStore<f64> = GrowableStore::new(2);
//! store.extend_from_slice(&[10.0, 20.0]).unwrap();
//! let view = store.view();
//! store.append(30.0).unwrap(); // grows, moving the data
//! assert!(!view.is_current(&store));
//! assert_eq!(store.get(2).unwrap(), 30.0);
//!
//! // Timestamped rows, kept sorted whatever the arrival order.
//! let mut rows = RecordBuffer::new(1, 10, RowFill::Constant(f64::NAN)).unwrap();
//! for ts in [100, 102, 101] {
//!     rows.add_or_update(ts, 0, ts as f64).unwrap();
//! }
//! assert_eq!(rows.slice(102, 2).unwrap(), &[101.0, 102.0]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `dynbuf-core` | IDs, the `Sample` trait, error types |
//! | [`store`] | `dynbuf-store` | `GrowableStore`, `BufferView`, store config and stats |
//! | [`cache`] | `dynbuf-cache` | `LastKnownValueCache`, `ChannelCounter`, ordering policy |
//! | [`series`] | `dynbuf-series` | Timestamp-keyed record buffers and counters |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and errors (`dynbuf-core`).
pub use dynbuf_core as types;

/// Growable storage and zero-copy views (`dynbuf-store`).
///
/// [`store::GrowableStore`] owns one contiguous allocation; every growth
/// bumps its generation and invalidates outstanding [`store::BufferView`]s.
pub use dynbuf_store as store;

/// Last-known-value cache (`dynbuf-cache`).
pub use dynbuf_cache as cache;

/// Timestamp-keyed record buffers (`dynbuf-series`).
///
/// [`series::RecordBuffer`] plus the forward-filling
/// [`series::LastKnownValuesBuffer`] and [`series::TimestampCounter`].
pub use dynbuf_series as series;

/// Common imports for typical dynbuf usage.
///
/// ```rust
/// use dynbuf::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use dynbuf_core::{ChannelId, Generation, Sample, Sequence, Timestamp};

    // Errors
    pub use dynbuf_core::{BufferError, ConfigError};

    // Storage
    pub use dynbuf_store::{BufferView, GrowableStore, StoreConfig};

    // Cache
    pub use dynbuf_cache::{CacheConfig, LastKnownValueCache, OrderingPolicy};

    // Record buffers
    pub use dynbuf_series::{LastKnownValuesBuffer, RecordBuffer, RowFill, TimestampCounter};
}
