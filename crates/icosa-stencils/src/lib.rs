//! ICON mesh definitions and reference stencils for the icosa engine.
//!
//! - [`icon`]: the ICON dimensions, offsets and horizontal markers.
//! - [`diffusion`]: stencils 02, 06 and 13 of the nonhydrostatic diffusion
//!   scheme, each a ready-to-run [`Program`](icosa_engine::Program).
//! - [`tutorial`]: the `run_add` and `sum_adjacent_cells` introductory
//!   programs with the hexagon mesh they run on.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod diffusion;
pub mod error;
pub mod icon;
pub mod tutorial;

pub use diffusion::DiffusionStencil;
pub use error::StencilError;
