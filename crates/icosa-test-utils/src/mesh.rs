//! A small periodic triangular mesh with every standard connectivity.
//!
//! The mesh is a 3×3 grid of vertices on a torus. Each grid square is split
//! by its anti-diagonal into a lower and an upper triangle:
//!
//! ```text
//!   (i,j+1) ───── (i+1,j+1)
//!      │ ╲   upper   │
//!      │   ╲         │
//!      │ lower ╲     │
//!   (i,j) ─────── (i+1,j)
//! ```
//!
//! Vertex `v = j * 3 + i` owns three edges (`3v` horizontal, `3v + 1`
//! vertical, `3v + 2` diagonal) and two cells (`2v` lower, `2v + 1` upper).
//! Every vertex has six edges and six cells; every edge has two cells.

use std::sync::Arc;

use icosa_core::{Dimension, HorizontalKind};
use icosa_mesh::{ConnectivityTable, MeshError, Offset, OffsetProvider};
use indexmap::IndexMap;

/// The cell dimension.
pub fn cell() -> Dimension {
    Dimension::horizontal("Cell", HorizontalKind::Cell)
}

/// The edge dimension.
pub fn edge() -> Dimension {
    Dimension::horizontal("Edge", HorizontalKind::Edge)
}

/// The vertex dimension.
pub fn vertex() -> Dimension {
    Dimension::horizontal("Vertex", HorizontalKind::Vertex)
}

/// The vertical dimension.
pub fn k() -> Dimension {
    Dimension::vertical("K")
}

const NX: usize = 3;
const NY: usize = 3;

fn v(i: usize, j: usize) -> usize {
    (j % NY) * NX + (i % NX)
}

fn e_h(i: usize, j: usize) -> usize {
    3 * v(i, j)
}

fn e_v(i: usize, j: usize) -> usize {
    3 * v(i, j) + 1
}

fn e_d(i: usize, j: usize) -> usize {
    3 * v(i, j) + 2
}

fn entries<const N: usize>(rows: Vec<[usize; N]>) -> Vec<[i32; N]> {
    rows.into_iter().map(|r| r.map(|x| x as i32)).collect()
}

/// The periodic 3×3 triangular test mesh.
#[derive(Clone, Debug)]
pub struct SimpleMesh {
    tables: IndexMap<String, Arc<ConnectivityTable>>,
    offsets: IndexMap<String, Offset>,
}

impl SimpleMesh {
    /// Number of cells.
    pub const N_CELLS: usize = 2 * NX * NY;
    /// Number of edges.
    pub const N_EDGES: usize = 3 * NX * NY;
    /// Number of vertices.
    pub const N_VERTICES: usize = NX * NY;

    /// Build every table and offset.
    pub fn new() -> Result<Self, MeshError> {
        let mut c2e = Vec::with_capacity(Self::N_CELLS);
        let mut c2v = Vec::with_capacity(Self::N_CELLS);
        let mut e2v = vec![[0usize; 2]; Self::N_EDGES];
        for j in 0..NY {
            for i in 0..NX {
                c2e.push([e_h(i, j), e_d(i, j), e_v(i, j)]);
                c2e.push([e_d(i, j), e_v(i + 1, j), e_h(i, j + 1)]);
                c2v.push([v(i, j), v(i + 1, j), v(i, j + 1)]);
                c2v.push([v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]);
                e2v[e_h(i, j)] = [v(i, j), v(i + 1, j)];
                e2v[e_v(i, j)] = [v(i, j), v(i, j + 1)];
                e2v[e_d(i, j)] = [v(i + 1, j), v(i, j + 1)];
            }
        }

        let c2e = ConnectivityTable::from_rows(cell(), edge(), &entries(c2e))?;
        let c2v = ConnectivityTable::from_rows(cell(), vertex(), &entries(c2v))?;
        let e2v = ConnectivityTable::from_rows(edge(), vertex(), &entries(e2v))?;
        let e2c = c2e.transpose(Self::N_EDGES, 2)?;
        let v2e = e2v.transpose(Self::N_VERTICES, 6)?;
        let v2c = c2v.transpose(Self::N_VERTICES, 6)?;

        let mut mesh = Self {
            tables: IndexMap::new(),
            offsets: IndexMap::new(),
        };
        for (name, table) in [
            ("C2E", c2e),
            ("C2V", c2v),
            ("E2C", e2c),
            ("E2V", e2v),
            ("V2E", v2e),
            ("V2C", v2c),
        ] {
            let local = Dimension::local(format!("{name}Dim"), table.arity());
            let offset = Offset::new(
                name,
                table.neighbor().clone(),
                (table.origin().clone(), local),
            )?;
            mesh.offsets.insert(name.to_string(), offset);
            mesh.tables.insert(name.to_string(), Arc::new(table));
        }
        Ok(mesh)
    }

    /// The table bound to `name` (`"C2E"`, `"E2C"`, ...).
    pub fn table(&self, name: &str) -> Option<&ConnectivityTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    /// The offset declared for `name`.
    pub fn offset(&self, name: &str) -> Option<&Offset> {
        self.offsets.get(name)
    }

    /// A provider binding every table.
    pub fn offset_provider(&self) -> OffsetProvider {
        self.tables
            .iter()
            .fold(OffsetProvider::new(), |p, (name, t)| p.with(name.clone(), Arc::clone(t)))
    }

    /// Entity count of a horizontal dimension.
    pub fn count(&self, dim: &Dimension) -> Option<usize> {
        match dim.horizontal_kind()? {
            HorizontalKind::Cell => Some(Self::N_CELLS),
            HorizontalKind::Edge => Some(Self::N_EDGES),
            HorizontalKind::Vertex => Some(Self::N_VERTICES),
        }
    }
}
