//! Field storage for the icosa stencil engine.
//!
//! A [`Field`] is a dense row-major array tagged with its ordered dimension
//! list. [`Bindings`] is the caller-owned map of named fields and scalars
//! that operator calls and programs read from and write into.
//!
//! # Layout
//!
//! ```text
//! Field[Edge, K]   shape [n_edges, n_levels]  strides h = n_levels, k = 1
//! Field[Edge]      shape [n_edges]            strides h = 1,        k = 0 (broadcast)
//! Field[Cell, C2E] shape [n_cells, 3]         strides h = 3, local = 1
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bindings;
pub mod error;
pub mod field;

pub use bindings::Bindings;
pub use error::FieldError;
pub use field::{AxisStrides, Field};
