//! Program sequencing and mesh configuration for the icosa stencil engine.
//!
//! A [`Program`] is an ordered list of operator invocations over a declared
//! set of field and scalar parameters. Building it validates every
//! statement once; running it checks offsets and bindings up front and
//! then executes the statements strictly in order, so each statement sees
//! the writes of the ones before it.
//!
//! [`MeshConfig`] describes the mesh a program runs on (dimensions,
//! offsets, horizontal markers, level count) and checks it for
//! consistency before any field is allocated.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod program;

pub use config::{ConfigError, MeshConfig};
pub use metrics::RunMetrics;
pub use program::{Program, ProgramBuilder};
