//! Dimensions, offsets and horizontal markers of the ICON grid.
//!
//! ICON orders every horizontal entity kind so that boundary bands are
//! contiguous index ranges. The markers below delimit those bands:
//!
//! ```text
//! lb ──── nudging ──── interior ──── halo ──── end
//! 0       1000         2000          3000      4000
//! ```
//!
//! Stencils restrict themselves to a band with
//! [`Domain::across`](icosa_mesh::Domain::across), e.g. `[lb + 4, nudging + 1)`.

use icosa_core::{Dimension, DimensionRegistry, HorizontalKind};
use icosa_engine::MeshConfig;
use icosa_mesh::{HorizontalMarkers, Offset};

use crate::error::StencilError;

/// Lateral boundary start.
pub const LB: usize = 0;
/// Start of the nudging zone.
pub const NUDGING: usize = 1000;
/// Start of the prognostic interior.
pub const INTERIOR: usize = 2000;
/// Start of the halo.
pub const HALO: usize = 3000;
/// One past the last entity.
pub const END: usize = 4000;

// ── Dimensions ─────────────────────────────────────────────────────

/// Cells.
pub fn cell() -> Dimension {
    Dimension::horizontal("Cell", HorizontalKind::Cell)
}

/// Edges.
pub fn edge() -> Dimension {
    Dimension::horizontal("Edge", HorizontalKind::Edge)
}

/// Vertices.
pub fn vertex() -> Dimension {
    Dimension::horizontal("Vertex", HorizontalKind::Vertex)
}

/// Vertical levels.
pub fn k() -> Dimension {
    Dimension::vertical("K")
}

/// The three edges of a cell.
pub fn c2e_dim() -> Dimension {
    Dimension::local("C2EDim", 3)
}

/// The two cells of an edge.
pub fn e2c_dim() -> Dimension {
    Dimension::local("E2CDim", 2)
}

/// The two vertices of an edge.
pub fn e2v_dim() -> Dimension {
    Dimension::local("E2VDim", 2)
}

/// The (up to) six edges of a vertex.
pub fn v2e_dim() -> Dimension {
    Dimension::local("V2EDim", 6)
}

/// Every ICON dimension, in declaration order.
pub fn registry() -> Result<DimensionRegistry, StencilError> {
    Ok(DimensionRegistry::from_dimensions([
        cell(),
        edge(),
        vertex(),
        k(),
        c2e_dim(),
        e2c_dim(),
        e2v_dim(),
        v2e_dim(),
    ])?)
}

// ── Offsets ────────────────────────────────────────────────────────

/// Cell → edge.
pub fn c2e() -> Result<Offset, StencilError> {
    Ok(Offset::new("C2E", edge(), (cell(), c2e_dim()))?)
}

/// Edge → cell.
pub fn e2c() -> Result<Offset, StencilError> {
    Ok(Offset::new("E2C", cell(), (edge(), e2c_dim()))?)
}

/// Edge → vertex.
pub fn e2v() -> Result<Offset, StencilError> {
    Ok(Offset::new("E2V", vertex(), (edge(), e2v_dim()))?)
}

/// Vertex → edge.
pub fn v2e() -> Result<Offset, StencilError> {
    Ok(Offset::new("V2E", edge(), (vertex(), v2e_dim()))?)
}

// ── Markers ────────────────────────────────────────────────────────

/// `lb`, `nudging`, `interior`, `halo`, `end`.
pub fn markers() -> Result<HorizontalMarkers, StencilError> {
    Ok(HorizontalMarkers::new([
        ("lb", LB),
        ("nudging", NUDGING),
        ("interior", INTERIOR),
        ("halo", HALO),
        ("end", END),
    ])?)
}

/// A validated configuration for an ICON grid with the given entity
/// counts and level count.
pub fn mesh_config(
    cells: usize,
    edges: usize,
    vertices: usize,
    levels: usize,
) -> Result<MeshConfig, StencilError> {
    let config = MeshConfig {
        dimensions: registry()?,
        entity_counts: [
            ("Cell".to_string(), cells),
            ("Edge".to_string(), edges),
            ("Vertex".to_string(), vertices),
        ]
        .into_iter()
        .collect(),
        offsets: vec![c2e()?, e2c()?, e2v()?, v2e()?],
        markers: markers()?,
        levels,
    };
    config.validate()?;
    Ok(config)
}
