use std::sync::Arc;

use icosa_core::{Dimension, EvalError, HorizontalKind};
use icosa_field::{Bindings, Field};
use icosa_mesh::{ConnectivityTable, Offset, OffsetProvider};
use icosa_operator::expr::{field, neighbor_sum, shift, sum_over};
use icosa_operator::{call, ExprOperator, Invocation};
use icosa_test_utils::mesh::{cell, edge, k};
use icosa_test_utils::{random_field, SimpleMesh};
use proptest::prelude::*;

fn e2c_offset() -> Offset {
    Offset::new("E2C", cell(), (edge(), Dimension::local("E2CDim", 2))).unwrap()
}

fn sum_cells_op() -> ExprOperator {
    let e2c = e2c_offset();
    ExprOperator::builder("sum_adjacent_cells")
        .field("cells", [cell()])
        .output([edge()])
        .body(neighbor_sum(shift("cells", &e2c), &e2c))
        .build()
        .unwrap()
}

fn stub_provider(rows: &[[i32; 2]]) -> OffsetProvider {
    OffsetProvider::new().with("E2C", ConnectivityTable::from_rows(edge(), cell(), rows).unwrap())
}

#[test]
fn stub_sum_over_edge_to_cell() {
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[3], vec![1.0, 1.0, 2.0]).unwrap())
        .with_field("edges", Field::<f64>::zeros([edge()], &[3]).unwrap());
    let provider = stub_provider(&[[0, 1], [1, 2], [2, -1]]);

    call(&sum_cells_op(), &mut b, "edges", &provider).unwrap();

    assert_eq!(b.field("edges").unwrap().as_slice(), &[2.0, 3.0, 2.0]);
}

#[test]
fn entity_without_neighbors_sums_to_zero() {
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[2], vec![4.0, 5.0]).unwrap())
        .with_field("edges", Field::<f64>::filled([edge()], &[2], 9.0).unwrap());
    let provider = stub_provider(&[[-1, -1], [1, -1]]);

    call(&sum_cells_op(), &mut b, "edges", &provider).unwrap();

    assert_eq!(b.field("edges").unwrap().as_slice(), &[0.0, 5.0]);
}

#[test]
fn weighted_reduction_is_a_directed_difference() {
    let mesh = SimpleMesh::new().unwrap();
    let e2c = mesh.offset("E2C").unwrap().clone();
    let op = ExprOperator::builder("gradient")
        .field("theta", [cell(), k()])
        .output([edge(), k()])
        .body(sum_over(shift("theta", &e2c), &e2c, [-1.0, 1.0]))
        .build()
        .unwrap();
    let levels = 4;
    let theta = random_field::<f64>([cell(), k()], &[SimpleMesh::N_CELLS, levels], 3).unwrap();
    let mut b = Bindings::new()
        .with_field("theta", theta.clone())
        .with_field(
            "grad",
            Field::zeros([edge(), k()], &[SimpleMesh::N_EDGES, levels]).unwrap(),
        );

    call(&op, &mut b, "grad", &mesh.offset_provider()).unwrap();

    let table = mesh.table("E2C").unwrap();
    let grad = b.field("grad").unwrap();
    for e in 0..SimpleMesh::N_EDGES {
        let (n0, n1) = (table.neighbor_at(e, 0).unwrap(), table.neighbor_at(e, 1).unwrap());
        for lvl in 0..levels {
            let expected = theta.get(&[n1, lvl]).unwrap() - theta.get(&[n0, lvl]).unwrap();
            assert_eq!(grad.get(&[e, lvl]).unwrap(), expected, "edge {e} level {lvl}");
        }
    }
}

#[test]
fn sentinel_slot_ignores_its_weight() {
    let e2c = e2c_offset();
    let op = ExprOperator::builder("gradient")
        .field("cells", [cell()])
        .output([edge()])
        .body(sum_over(shift("cells", &e2c), &e2c, [f64::NAN, 1.0]))
        .build()
        .unwrap();
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[2], vec![3.0, 7.0]).unwrap())
        .with_field("edges", Field::<f64>::zeros([edge()], &[1]).unwrap());

    call(&op, &mut b, "edges", &stub_provider(&[[-1, 1]])).unwrap();

    assert_eq!(b.field("edges").unwrap().as_slice(), &[7.0]);
}

#[test]
fn sparse_coefficients_are_read_per_slot() {
    let mesh = SimpleMesh::new().unwrap();
    let c2e = mesh.offset("C2E").unwrap().clone();
    let local = c2e.local().clone();
    let op = ExprOperator::builder("divergence")
        .field("vn", [edge(), k()])
        .field("geofac_div", [cell(), local.clone()])
        .output([cell(), k()])
        .body(neighbor_sum(shift("vn", &c2e) * field("geofac_div"), &c2e))
        .build()
        .unwrap();
    let levels = 2;
    let vn = random_field::<f64>([edge(), k()], &[SimpleMesh::N_EDGES, levels], 11).unwrap();
    let geofac = random_field::<f64>([cell(), local], &[SimpleMesh::N_CELLS, 3], 12).unwrap();
    let mut b = Bindings::new()
        .with_field("vn", vn.clone())
        .with_field("geofac_div", geofac.clone())
        .with_field(
            "div",
            Field::zeros([cell(), k()], &[SimpleMesh::N_CELLS, levels]).unwrap(),
        );

    call(&op, &mut b, "div", &mesh.offset_provider()).unwrap();

    let table = mesh.table("C2E").unwrap();
    let div = b.field("div").unwrap();
    for c in 0..SimpleMesh::N_CELLS {
        for lvl in 0..levels {
            let mut expected = 0.0;
            for (slot, e) in table.neighbors(c) {
                expected += vn.get(&[e, lvl]).unwrap() * geofac.get(&[c, slot]).unwrap();
            }
            assert_eq!(div.get(&[c, lvl]).unwrap(), expected);
        }
    }
}

#[test]
fn missing_offset_fails_before_mutation() {
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[3], vec![1.0, 1.0, 2.0]).unwrap())
        .with_field("edges", Field::<f64>::filled([edge()], &[3], -4.0).unwrap());

    let err = call(&sum_cells_op(), &mut b, "edges", &OffsetProvider::new()).unwrap_err();

    assert_eq!(
        err,
        EvalError::MissingOffsetProvider {
            offset: "E2C".into()
        }
    );
    assert_eq!(b.field("edges").unwrap().as_slice(), &[-4.0, -4.0, -4.0]);
}

#[test]
fn table_with_swapped_dimensions_is_rejected() {
    let mut b = Bindings::new()
        .with_field("cells", Field::<f64>::zeros([cell()], &[3]).unwrap())
        .with_field("edges", Field::<f64>::zeros([edge()], &[3]).unwrap());
    let provider = OffsetProvider::new().with(
        "E2C",
        ConnectivityTable::from_rows(cell(), edge(), &[[0, 1], [1, 2], [2, -1]]).unwrap(),
    );
    let err = call(&sum_cells_op(), &mut b, "edges", &provider).unwrap_err();
    assert!(matches!(err, EvalError::DimensionMismatch { .. }));
}

#[test]
fn out_of_range_neighbor_fails_fast() {
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[3], vec![1.0, 1.0, 2.0]).unwrap())
        .with_field("edges", Field::<f64>::filled([edge()], &[3], 8.0).unwrap());
    let provider = stub_provider(&[[0, 1], [1, 3], [2, -1]]);

    let err = call(&sum_cells_op(), &mut b, "edges", &provider).unwrap_err();

    assert_eq!(
        err,
        EvalError::InvalidNeighborIndex {
            offset: "E2C".into(),
            row: 1,
            slot: 1,
            value: 3,
            target_count: 3
        }
    );
    assert_eq!(b.field("edges").unwrap().as_slice(), &[8.0, 8.0, 8.0]);
}

#[test]
fn out_of_range_neighbor_outside_domain_is_not_read() {
    let mut b = Bindings::new()
        .with_field("cells", Field::new([cell()], &[3], vec![1.0, 1.0, 2.0]).unwrap())
        .with_field("edges", Field::<f64>::zeros([edge()], &[3]).unwrap());
    let provider = stub_provider(&[[0, 1], [1, 3], [2, -1]]);

    Invocation::<f64>::new(Arc::new(sum_cells_op()))
        .out("edges")
        .domain(icosa_mesh::Domain::full().across(2..3))
        .execute(&mut b, &provider)
        .unwrap();

    assert_eq!(b.field("edges").unwrap().as_slice(), &[0.0, 0.0, 2.0]);
}

#[test]
fn f32_fields_accumulate_in_single_precision() {
    let mut b = Bindings::<f32>::new()
        .with_field("cells", Field::new([cell()], &[3], vec![0.5, 0.25, 2.0]).unwrap())
        .with_field("edges", Field::zeros([edge()], &[3]).unwrap());

    call(
        &sum_cells_op(),
        &mut b,
        "edges",
        &stub_provider(&[[0, 1], [1, 2], [2, -1]]),
    )
    .unwrap();

    assert_eq!(b.field("edges").unwrap().as_slice(), &[0.75f32, 2.25, 2.0]);
}

#[test]
fn vertex_reduction_on_simple_mesh_counts_neighbors() {
    let mesh = SimpleMesh::new().unwrap();
    let v2e = mesh.offset("V2E").unwrap().clone();
    let vertex = Dimension::horizontal("Vertex", HorizontalKind::Vertex);
    let op = ExprOperator::builder("count_edges")
        .field("ones", [edge()])
        .output([vertex.clone()])
        .body(neighbor_sum(shift("ones", &v2e), &v2e))
        .build()
        .unwrap();
    let mut b = Bindings::new()
        .with_field("ones", Field::<f64>::filled([edge()], &[SimpleMesh::N_EDGES], 1.0).unwrap())
        .with_field("degree", Field::zeros([vertex], &[SimpleMesh::N_VERTICES]).unwrap());

    Invocation::<f64>::new(Arc::new(op))
        .arg("ones", "ones")
        .out("degree")
        .execute(&mut b, &mesh.offset_provider())
        .unwrap();

    assert!(b.field("degree").unwrap().as_slice().iter().all(|&d| d == 6.0));
}

proptest! {
    #[test]
    fn neighbor_sum_matches_reference(
        rows in prop::collection::vec(prop::array::uniform2(-1i32..6), 1..40),
        values in prop::collection::vec(-100i32..100, 6),
    ) {
        let cells: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
        let mut b = Bindings::new()
            .with_field("cells", Field::new([cell()], &[6], cells.clone()).unwrap())
            .with_field("edges", Field::<f64>::zeros([edge()], &[rows.len()]).unwrap());

        call(&sum_cells_op(), &mut b, "edges", &stub_provider(&rows)).unwrap();

        let got = b.field("edges").unwrap().as_slice();
        for (e, row) in rows.iter().enumerate() {
            let expected: f64 = row
                .iter()
                .filter(|&&n| n >= 0)
                .map(|&n| cells[n as usize])
                .sum();
            prop_assert_eq!(got[e], expected);
        }
    }
}
