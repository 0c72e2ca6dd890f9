//! Introductory programs: pointwise addition and a sum over neighbours.
//!
//! The neighbour example runs on a hexagon of six triangular cells and
//! twelve edges. Edges 0..6 lie on the rim and touch a single cell; edges
//! 6..12 are the spokes shared by two cells.
//!
//! ```text
//! edge → cell                      cell → edge
//!  0: [0, -]   6: [0, 5]            0: [0, 6,  7]
//!  1: [2, -]   7: [0, 1]            1: [7, 8,  9]
//!  2: [2, -]   8: [1, 2]            2: [1, 2,  8]
//!  3: [3, -]   9: [1, 3]            3: [3, 9, 10]
//!  4: [4, -]  10: [3, 4]            4: [4, 10, 11]
//!  5: [5, -]  11: [4, 5]            5: [5, 6, 11]
//! ```

use std::sync::Arc;

use icosa_core::Element;
use icosa_engine::Program;
use icosa_field::{Bindings, Field};
use icosa_mesh::{ConnectivityTable, OffsetProvider};
use icosa_operator::expr::{field, neighbor_sum, shift};
use icosa_operator::{ExprOperator, Invocation};

use crate::error::StencilError;
use crate::icon::{self, cell, edge, k};

/// Edge → cell table of the hexagon.
pub const HEXAGON_E2C: [[i32; 2]; 12] = [
    [0, -1],
    [2, -1],
    [2, -1],
    [3, -1],
    [4, -1],
    [5, -1],
    [0, 5],
    [0, 1],
    [1, 2],
    [1, 3],
    [3, 4],
    [4, 5],
];

/// Cell → edge table of the hexagon.
pub const HEXAGON_C2E: [[i32; 3]; 6] = [
    [0, 6, 7],
    [7, 8, 9],
    [1, 2, 8],
    [3, 9, 10],
    [4, 10, 11],
    [5, 6, 11],
];

/// Cell values used by the neighbour-sum example.
pub const HEXAGON_CELL_VALUES: [f64; 6] = [1.0, 1.0, 2.0, 3.0, 5.0, 8.0];

/// `E2C` and `C2E` providers for the hexagon.
pub fn hexagon_provider() -> Result<OffsetProvider, StencilError> {
    Ok(OffsetProvider::new()
        .with(
            "E2C",
            ConnectivityTable::from_rows(edge(), cell(), &HEXAGON_E2C)?,
        )
        .with(
            "C2E",
            ConnectivityTable::from_rows(cell(), edge(), &HEXAGON_C2E)?,
        ))
}

// ── add ────────────────────────────────────────────────────────────

/// `a + b` on `[Cell, K]`.
pub fn add() -> Result<ExprOperator, StencilError> {
    Ok(ExprOperator::builder("add")
        .field("a", [cell(), k()])
        .field("b", [cell(), k()])
        .output([cell(), k()])
        .body(field("a") + field("b"))
        .build()?)
}

/// `result = a + b; result = b + result`.
///
/// The second statement reads the first statement's `result`, so with
/// constant inputs the final value is `a + 2b`.
pub fn run_add<T: Element>() -> Result<Program<T>, StencilError> {
    let add = Arc::new(add()?);
    Ok(Program::<T>::builder("run_add")
        .field("a", [cell(), k()])
        .field("b", [cell(), k()])
        .field("result", [cell(), k()])
        .statement(Invocation::<T>::new(add.clone()).out("result"))
        .statement(
            Invocation::<T>::new(add)
                .arg("a", "b")
                .arg("b", "result")
                .out("result"),
        )
        .build()?)
}

// ── sum_adjacent_cells ─────────────────────────────────────────────

/// `Σ_E2C cells` on `[Edge]`.
pub fn sum_adjacent_cells() -> Result<ExprOperator, StencilError> {
    let e2c = icon::e2c()?;
    Ok(ExprOperator::builder("sum_adjacent_cells")
        .field("cells", [cell()])
        .output([edge()])
        .body(neighbor_sum(shift("cells", &e2c), &e2c))
        .build()?)
}

/// Single-statement program writing [`sum_adjacent_cells`] into
/// `edge_values`.
pub fn run_sum_adjacent_cells<T: Element>() -> Result<Program<T>, StencilError> {
    Ok(Program::<T>::builder("run_sum_adjacent_cells")
        .field("cells", [cell()])
        .field("edge_values", [edge()])
        .statement(Invocation::<T>::new(Arc::new(sum_adjacent_cells()?)).out("edge_values"))
        .build()?)
}

/// `cells` holding [`HEXAGON_CELL_VALUES`] and a zeroed `edge_values`.
pub fn hexagon_bindings<T: Element>() -> Result<Bindings<T>, StencilError> {
    let cells = HEXAGON_CELL_VALUES.iter().map(|&v| T::from_f64(v)).collect();
    Ok(Bindings::new()
        .with_field("cells", Field::new([cell()], &[6], cells)?)
        .with_field("edge_values", Field::zeros([edge()], &[12])?))
}
