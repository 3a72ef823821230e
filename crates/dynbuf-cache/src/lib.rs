//! Last-known-value tracking for a fixed set of channels.
//!
//! [`LastKnownValueCache`] keeps one slot per channel inside a
//! [`GrowableStore`](dynbuf_store::GrowableStore) and overwrites it on every
//! update, so a snapshot is always `num_channels` samples long and costs
//! O(num_channels) no matter how many updates arrived. A
//! [`ChannelCounter`] stamps each update with a per-channel sequence.
//!
//! Forward fill falls out of overwrite-in-place: a channel reports its most
//! recent value until the next update replaces it, and the caller-supplied
//! initial value until its first update.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod counter;

pub use cache::LastKnownValueCache;
pub use config::{CacheConfig, OrderingPolicy};
pub use counter::ChannelCounter;
