//! Growable contiguous storage for fixed-width numeric samples.
//!
//! A [`GrowableStore`] owns exactly one contiguous allocation plus a
//! logical size. Appends are amortized O(1); when the allocation is
//! exhausted the store moves to a new one of double the capacity. This
//! crate is one of two that may contain `unsafe` code (along with
//! `dynbuf-ffi`), confined to the `raw` module.
//!
//! # Architecture
//!
//! ```text
//! GrowableStore<T>
//! ├── Vec<T>            (single allocation, never reallocated implicitly)
//! ├── Generation        (bumped on every move to a new allocation)
//! ├── StoreConfig       (initial capacity, optional ceiling)
//! └── StoreStats        (growth counters)
//!
//! BufferView<T>         (ptr, len, stride, generation), non-owning
//! ```
//!
//! # View validity
//!
//! A [`BufferView`] borrows nothing at the type level so it can cross a
//! foreign boundary. It is valid until the originating store moves to a
//! new allocation, which is observable as a change of
//! [`GrowableStore::generation`]. The check is left to the caller
//! ([`BufferView::is_current`]) so that the write path stays branch-free.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
mod raw;
pub mod stats;
pub mod store;
pub mod view;

pub use config::StoreConfig;
pub use stats::StoreStats;
pub use store::GrowableStore;
pub use view::BufferView;
