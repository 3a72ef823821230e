//! Core types for the dynbuf numeric buffer engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, error types and the [`Sample`] trait shared by the
//! store, cache and record-buffer crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod sample;

pub use error::{BufferError, ConfigError};
pub use id::{ChannelId, Generation, Sequence, Timestamp};
pub use sample::Sample;
