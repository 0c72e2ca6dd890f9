//! Icosa: field operators and stencil programs on unstructured meshes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all icosa sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use icosa::operator::expr::{neighbor_sum, shift};
//! use icosa::prelude::*;
//!
//! let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
//! let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
//! let e2c = Offset::new("E2C", cell.clone(), (edge.clone(), Dimension::local("E2CDim", 2)))
//!     .unwrap();
//!
//! // Each edge sums the cells on either side of it.
//! let op = ExprOperator::builder("sum_cells")
//!     .field("cells", [cell.clone()])
//!     .output([edge.clone()])
//!     .body(neighbor_sum(shift("cells", &e2c), &e2c))
//!     .build()
//!     .unwrap();
//!
//! let program = Program::<f64>::builder("edges_from_cells")
//!     .field("cells", [cell.clone()])
//!     .field("edges", [edge.clone()])
//!     .statement(Invocation::<f64>::new(Arc::new(op)).out("edges"))
//!     .build()
//!     .unwrap();
//!
//! // The last edge lies on the boundary and has a single cell.
//! let rows = [[0, 1], [1, 2], [2, -1]];
//! let table = ConnectivityTable::from_rows(edge.clone(), cell.clone(), rows.as_slice()).unwrap();
//! let provider = OffsetProvider::new().with("E2C", table);
//!
//! let mut bindings = Bindings::new()
//!     .with_field("cells", Field::new([cell], &[3], vec![1.0, 2.0, 4.0]).unwrap())
//!     .with_field("edges", Field::zeros([edge], &[3]).unwrap());
//! program.run(&mut bindings, &provider).unwrap();
//! assert_eq!(bindings.field("edges").unwrap().as_slice(), &[3.0, 6.0, 4.0]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `icosa-core` | Dimensions, element types, evaluation errors |
//! | [`field`] | `icosa-field` | Dense fields and named bindings |
//! | [`mesh`] | `icosa-mesh` | Connectivity tables, offsets, domains |
//! | [`operator`] | `icosa-operator` | Operators, expressions, invocations |
//! | [`engine`] | `icosa-engine` | Programs, mesh configuration, run metrics |
//! | [`stencils`] | `icosa-stencils` | ICON grid definitions and diffusion stencils |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Dimensions, element types and errors (`icosa-core`).
pub use icosa_core as types;

/// Dense fields and named bindings (`icosa-field`).
///
/// [`field::Field`] stores row-major data tagged with its dimensions;
/// [`field::Bindings`] maps parameter names to fields and scalars.
pub use icosa_field as field;

/// Connectivity tables, offsets and domains (`icosa-mesh`).
pub use icosa_mesh as mesh;

/// Field operators (`icosa-operator`).
///
/// Write bodies with [`operator::expr`] and wrap them in an
/// [`operator::ExprOperator`], or implement [`operator::FieldOperator`]
/// directly.
pub use icosa_operator as operator;

/// Programs and mesh configuration (`icosa-engine`).
pub use icosa_engine as engine;

/// ICON grid definitions and reference stencils (`icosa-stencils`).
pub use icosa_stencils as stencils;

/// Common imports for typical icosa usage.
///
/// ```rust
/// use icosa::prelude::*;
/// ```
pub mod prelude {
    // Dimensions and elements
    pub use icosa_core::{Dimension, DimensionRegistry, Element, HorizontalKind};

    // Errors
    pub use icosa_core::{EvalError, ProgramError};
    pub use icosa_engine::ConfigError;
    pub use icosa_operator::PlanError;

    // Storage
    pub use icosa_field::{Bindings, Field};

    // Mesh
    pub use icosa_mesh::{ConnectivityTable, Domain, HorizontalMarkers, Offset, OffsetProvider};

    // Operators
    pub use icosa_operator::{EvalContext, ExprOperator, FieldOperator, Invocation, Signature};

    // Engine
    pub use icosa_engine::{MeshConfig, Program, RunMetrics};

    // Stencils
    pub use icosa_stencils::{DiffusionStencil, StencilError};
}
