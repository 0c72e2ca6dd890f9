//! Core types for the icosa stencil engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental abstractions used throughout the workspace: dimensions and
//! the dimension registry, numeric element types, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dimension;
pub mod element;
pub mod error;

pub use dimension::{
    classify, format_dims, AxisRoles, Dimension, DimensionKind, DimensionRegistry, Dims,
    HorizontalKind,
};
pub use element::{Element, ElementType};
pub use error::{DimensionError, EvalError, ProgramError};
