//! Benchmark meshes and inputs for the icosa stencil engine.
//!
//! - [`Torus`]: a periodic triangular mesh of any size, with `C2E` and
//!   `E2C` tables over the ICON dimensions
//! - [`reference_torus`]: 64×64 vertices, large enough for every ICON band
//! - [`diffusion_bindings`]: seeded inputs for a [`DiffusionStencil`]
//! - [`default_programs`]: every stencil built over its default band

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use icosa_core::Element;
use icosa_engine::Program;
use icosa_field::{Bindings, Field};
use icosa_mesh::{ConnectivityTable, OffsetProvider};
use icosa_stencils::icon::{c2e_dim, cell, edge, k};
use icosa_stencils::{DiffusionStencil, StencilError};
use icosa_test_utils::{random_field, random_field_in};

/// A periodic `nx × ny` vertex grid split into triangles.
///
/// Vertex `v` owns edges `3v..3v + 3` and cells `2v`, `2v + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Torus {
    /// Vertices along x.
    pub nx: usize,
    /// Vertices along y.
    pub ny: usize,
}

impl Torus {
    /// Number of cells.
    pub fn cells(&self) -> usize {
        2 * self.nx * self.ny
    }

    /// Number of edges.
    pub fn edges(&self) -> usize {
        3 * self.nx * self.ny
    }

    /// `C2E` and its transpose `E2C`.
    pub fn provider(&self) -> Result<OffsetProvider, StencilError> {
        let vertex = |i: usize, j: usize| (j % self.ny) * self.nx + (i % self.nx);
        let mut rows = Vec::with_capacity(self.cells());
        for j in 0..self.ny {
            for i in 0..self.nx {
                let (here, right, up) = (vertex(i, j), vertex(i + 1, j), vertex(i, j + 1));
                // Horizontal, vertical and diagonal edges are 3v, 3v + 1, 3v + 2.
                rows.push([3 * here, 3 * here + 2, 3 * here + 1].map(|e| e as i32));
                rows.push([3 * here + 2, 3 * right + 1, 3 * up].map(|e| e as i32));
            }
        }
        let c2e = ConnectivityTable::from_rows(cell(), edge(), rows.as_slice())?;
        let e2c = c2e.transpose(self.edges(), 2)?;
        Ok(OffsetProvider::new().with("C2E", c2e).with("E2C", e2c))
    }
}

/// 64×64 vertices: 8192 cells, 12288 edges.
pub fn reference_torus() -> Torus {
    Torus { nx: 64, ny: 64 }
}

/// Every diffusion stencil paired with its program over its default band.
pub fn default_programs<T: Element>() -> Result<Vec<(DiffusionStencil, Program<T>)>, StencilError> {
    DiffusionStencil::ALL
        .into_iter()
        .map(|stencil| Ok((stencil, stencil.program::<T>()?)))
        .collect()
}

/// Seeded inputs for `stencil` on `mesh` with `levels` vertical levels.
///
/// Outputs are zeroed; divisors are drawn from `[1, 2)`.
pub fn diffusion_bindings(
    stencil: DiffusionStencil,
    mesh: Torus,
    levels: usize,
    seed: u64,
) -> Result<Bindings<f64>, StencilError> {
    let (cells, edges) = (mesh.cells(), mesh.edges());
    let edge_k = |s: u64| random_field([edge(), k()], &[edges, levels], seed + s);
    let bindings = match stencil {
        DiffusionStencil::CellDivergence => Bindings::new()
            .with_field("kh_smag_ec", edge_k(0)?)
            .with_field("vn", edge_k(1)?)
            .with_field("e_bln_c_s", random_field([cell(), c2e_dim()], &[cells, 3], seed + 2)?)
            .with_field("geofac_div", random_field([cell(), c2e_dim()], &[cells, 3], seed + 3)?)
            .with_field(
                "diff_multfac_smag",
                random_field_in([k()], &[levels], seed + 4, 1.0, 2.0)?,
            )
            .with_field("kh_c", Field::zeros([cell(), k()], &[cells, levels])?)
            .with_field("div", Field::zeros([cell(), k()], &[cells, levels])?),
        DiffusionStencil::BoundaryVelocity => Bindings::new()
            .with_field("z_nabla2_e", edge_k(0)?)
            .with_field("area_edge", random_field([edge()], &[edges], seed + 1)?)
            .with_field("vn", edge_k(2)?)
            .with_scalar("fac_bdydiff_v", 0.5),
        DiffusionStencil::ThetaGradient => Bindings::new()
            .with_field("kh_smag_e", edge_k(0)?)
            .with_field("inv_dual_edge_length", random_field([edge()], &[edges], seed + 1)?)
            .with_field("theta_v", random_field([cell(), k()], &[cells, levels], seed + 2)?)
            .with_field("z_nabla2_e", Field::zeros([edge(), k()], &[edges, levels])?),
    };
    Ok(bindings)
}
