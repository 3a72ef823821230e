//! Timestamp-keyed record buffers.
//!
//! A [`RecordBuffer`] holds rows of `n_variables` samples keyed by a
//! timestamp. Rows are stored contiguously in ascending timestamp order
//! inside one [`GrowableStore`](dynbuf_store::GrowableStore), so any run of
//! consecutive rows can be handed out as a single slice or view.
//!
//! Each row carries a reference counter: writes increment it and
//! [`RecordBuffer::release`] decrements it. When the buffer reaches its row
//! capacity, the leading run of fully released rows is evicted to make
//! room.
//!
//! Two specialisations sit on top:
//!
//! - [`LastKnownValuesBuffer`]: new rows start as a copy of the preceding
//!   row, so every row carries the last known value of every variable.
//! - [`TimestampCounter`]: a single-variable buffer of non-negative counts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod counter;
pub mod last_known;
pub mod records;

pub use config::{RecordConfig, RowFill};
pub use counter::TimestampCounter;
pub use last_known::LastKnownValuesBuffer;
pub use records::RecordBuffer;
