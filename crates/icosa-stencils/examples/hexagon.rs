//! Icosa quickstart on the six-cell hexagon.
//!
//! Demonstrates:
//!   1. Binding the hexagon's `E2C` and `C2E` tables to an offset provider
//!   2. Running `sum_adjacent_cells` to move cell values onto edges
//!   3. Running the two-statement `run_add` program
//!   4. Restricting a diffusion stencil to a band of edges
//!
//! Run with:
//!   cargo run --example hexagon

use icosa_field::{Bindings, Field};
use icosa_mesh::{Domain, OffsetProvider};
use icosa_stencils::icon::{cell, edge, k};
use icosa_stencils::tutorial::{self, HEXAGON_CELL_VALUES};
use icosa_stencils::DiffusionStencil;

// ─── Sizes ──────────────────────────────────────────────────────

const N_CELLS: usize = 6;
const N_EDGES: usize = 12;
const LEVELS: usize = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provider = tutorial::hexagon_provider()?;

    // ─── Cells to edges ─────────────────────────────────────────
    let program = tutorial::run_sum_adjacent_cells::<f64>()?;
    let mut bindings = tutorial::hexagon_bindings::<f64>()?;
    program.run(&mut bindings, &provider)?;

    println!("cell values: {HEXAGON_CELL_VALUES:?}");
    let edges = bindings.field("edge_values").ok_or("edge_values unbound")?;
    for (e, value) in edges.as_slice().iter().enumerate() {
        let kind = if e < 6 { "rim" } else { "spoke" };
        println!("  edge {e:>2} ({kind:<5}) = {value}");
    }

    // ─── Sequential statements ──────────────────────────────────
    let program = tutorial::run_add::<f64>()?;
    let mut bindings = Bindings::new()
        .with_field("a", Field::filled([cell(), k()], &[N_CELLS, LEVELS], 2.0)?)
        .with_field("b", Field::filled([cell(), k()], &[N_CELLS, LEVELS], 3.0)?)
        .with_field("result", Field::zeros([cell(), k()], &[N_CELLS, LEVELS])?);
    let metrics = program.run(&mut bindings, &OffsetProvider::new())?;
    let result = bindings.field("result").ok_or("result unbound")?;
    println!(
        "\nrun_add: result = {} after {} statements ({} us)",
        result.as_slice()[0],
        metrics.statements_run(),
        metrics.total_us
    );

    // ─── Banded update ──────────────────────────────────────────
    let spokes = Domain::full().across(6..N_EDGES);
    let program = DiffusionStencil::BoundaryVelocity.program_over::<f64>(spokes)?;
    let mut bindings = Bindings::new()
        .with_field("z_nabla2_e", Field::filled([edge(), k()], &[N_EDGES, LEVELS], 1.0)?)
        .with_field("area_edge", Field::filled([edge()], &[N_EDGES], 2.0)?)
        .with_field("vn", Field::zeros([edge(), k()], &[N_EDGES, LEVELS])?)
        .with_scalar("fac_bdydiff_v", 5.0);
    program.run(&mut bindings, &provider)?;
    let vn = bindings.field("vn").ok_or("vn unbound")?;
    let top: Vec<f64> = (0..N_EDGES).filter_map(|e| vn.get(&[e, 0])).collect();
    println!("\nboundary update over the spokes only: {top:?}");

    Ok(())
}
