//! Mesh topology for the icosa stencil engine.
//!
//! This crate holds everything that describes *where* values live and how
//! entities are connected, independent of the values themselves:
//!
//! - [`ConnectivityTable`]: sentinel-padded neighbour lists between two
//!   horizontal dimensions
//! - [`Offset`]: a named neighbour relation declared once per topology
//! - [`OffsetProvider`]: the per-call binding of offset names to tables
//! - [`HorizontalMarkers`] and [`Domain`]: boundary bands and the active
//!   iteration range of a statement

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod connectivity;
pub mod domain;
pub mod error;
pub mod offset;

pub use connectivity::{BadEntry, ConnectivityTable, SKIP_VALUE};
pub use domain::{Domain, HorizontalMarkers, VerticalDirection};
pub use error::{DomainError, MeshError};
pub use offset::{Offset, OffsetProvider};
