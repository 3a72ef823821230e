//! Python bindings for dynbuf.
//!
//! PyO3 classes wrapping the C ABI layer (`dynbuf-ffi`). The native
//! extension is named `_dynbuf`. Values cross into Python as NumPy
//! `float64` arrays, either copied or as read-only zero-copy views whose
//! base object is the owning wrapper.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unsafe_code)]

use pyo3::prelude::*;

mod array;
mod cache;
mod error;
mod records;
mod view;

/// The native `_dynbuf` extension module.
#[pymodule]
fn _dynbuf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Enums
    m.add_class::<cache::OrderingPolicy>()?;

    // Core classes
    m.add_class::<cache::LastKnownValues>()?;
    m.add_class::<array::DynamicArray>()?;
    m.add_class::<records::DynamicBuffer>()?;

    Ok(())
}
