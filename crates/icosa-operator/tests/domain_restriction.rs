//! Domain restriction, staging and argument checking across whole calls.

use std::sync::Arc;

use icosa_core::{Dimension, EvalError};
use icosa_field::{Bindings, Field};
use icosa_mesh::{Domain, OffsetProvider};
use icosa_operator::expr::{field, scalar};
use icosa_operator::{call, EvalContext, ExprOperator, FieldOperator, Invocation, Signature};
use icosa_test_utils::fixtures::{ConstOperator, CopyOperator};
use icosa_test_utils::mesh::{cell, edge, k};
use icosa_test_utils::random_field;
use proptest::prelude::*;

fn boundary_update() -> Arc<ExprOperator> {
    Arc::new(
        ExprOperator::builder("boundary_update")
            .field("vn", [edge(), k()])
            .field("z_nabla2_e", [edge(), k()])
            .field("area_edge", [edge()])
            .scalar("fac_bdydiff_v")
            .output([edge(), k()])
            .body(field("vn") + field("z_nabla2_e") * field("area_edge") * scalar("fac_bdydiff_v"))
            .build()
            .unwrap(),
    )
}

fn boundary_bindings(edges: usize, levels: usize) -> Bindings<f64> {
    Bindings::new()
        .with_field("vn", Field::zeros([edge(), k()], &[edges, levels]).unwrap())
        .with_field("z_nabla2_e", Field::filled([edge(), k()], &[edges, levels], 1.0).unwrap())
        .with_field("area_edge", Field::filled([edge()], &[edges], 2.0).unwrap())
        .with_scalar("fac_bdydiff_v", 5.0)
}

#[test]
fn boundary_update_writes_only_inside_band() {
    let (edges, levels) = (1200, 3);
    let mut b = boundary_bindings(edges, levels);

    Invocation::<f64>::new(boundary_update())
        .out("vn")
        .domain(Domain::upward().across(4..1001))
        .execute(&mut b, &OffsetProvider::new())
        .unwrap();

    let vn = b.field("vn").unwrap();
    for e in 0..edges {
        let expected = if (4..1001).contains(&e) { 10.0 } else { 0.0 };
        for lvl in 0..levels {
            assert_eq!(vn.get(&[e, lvl]).unwrap(), expected, "edge {e} level {lvl}");
        }
    }
}

#[test]
fn vertical_direction_does_not_change_results() {
    let (edges, levels) = (200, 5);
    let mut up = boundary_bindings(edges, levels);
    up.insert_field(
        "vn",
        random_field([edge(), k()], &[edges, levels], 21).unwrap(),
    );
    let mut down = up.clone();

    for (b, domain) in [
        (&mut up, Domain::upward().across(10..150)),
        (&mut down, Domain::downward().across(10..150)),
    ] {
        Invocation::<f64>::new(boundary_update())
            .out("vn")
            .domain(domain)
            .execute(b, &OffsetProvider::new())
            .unwrap();
    }

    assert_eq!(
        up.field("vn").unwrap().as_slice(),
        down.field("vn").unwrap().as_slice()
    );
}

#[test]
fn reading_and_writing_the_same_binding() {
    let op = ExprOperator::builder("increment")
        .field("x", [cell()])
        .output([cell()])
        .body(field("x") + 1.0)
        .build()
        .unwrap();
    let mut b = Bindings::new().with_field("x", Field::new([cell()], &[3], vec![1.0, 2.0, 3.0]).unwrap());

    call(&op, &mut b, "x", &OffsetProvider::new()).unwrap();

    assert_eq!(b.field("x").unwrap().as_slice(), &[2.0, 3.0, 4.0]);
}

#[test]
fn argument_routing_reads_renamed_bindings() {
    let copy = Arc::new(CopyOperator::new("copy", [cell()]).unwrap());
    let mut b = Bindings::new()
        .with_field("source", Field::new([cell()], &[2], vec![6.0, 7.0]).unwrap())
        .with_field("target", Field::<f64>::zeros([cell()], &[2]).unwrap());

    Invocation::<f64>::new(copy)
        .arg("input", "source")
        .out("target")
        .execute(&mut b, &OffsetProvider::new())
        .unwrap();

    assert_eq!(b.field("target").unwrap().as_slice(), &[6.0, 7.0]);
}

#[test]
fn missing_output_binding_is_reported() {
    let fill = Arc::new(ConstOperator::new("fill", [cell()], 1.0).unwrap());
    let mut b = Bindings::<f64>::new();
    let err = Invocation::<f64>::new(fill).execute(&mut b, &OffsetProvider::new()).unwrap_err();
    assert_eq!(err, EvalError::UnboundArgument { param: "out".into() });
}

#[test]
fn output_with_wrong_dimensions_is_a_shape_error() {
    let fill = ConstOperator::new("fill", [cell()], 1.0).unwrap();
    let mut b = Bindings::new().with_field("out", Field::<f64>::zeros([edge()], &[4]).unwrap());
    let err = call(&fill, &mut b, "out", &OffsetProvider::new()).unwrap_err();
    assert!(matches!(err, EvalError::Shape { ref field, .. } if field == "out"));
}

#[test]
fn domain_past_the_output_extent_is_a_shape_error() {
    let mut b = boundary_bindings(10, 2);
    let err = Invocation::<f64>::new(boundary_update())
        .out("vn")
        .domain(Domain::full().across(4..11))
        .execute(&mut b, &OffsetProvider::new())
        .unwrap_err();
    assert!(matches!(err, EvalError::Shape { .. }));
    assert!(b.field("vn").unwrap().as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn mismatched_argument_extent_is_a_shape_error() {
    let mut b = boundary_bindings(10, 2);
    b.insert_field("area_edge", Field::filled([edge()], &[9], 2.0).unwrap());
    let err = Invocation::<f64>::new(boundary_update())
        .out("vn")
        .execute(&mut b, &OffsetProvider::new())
        .unwrap_err();
    assert!(matches!(err, EvalError::Shape { ref field, .. } if field == "area_edge"));
}

#[test]
fn argument_with_wrong_dimensions_is_rejected() {
    let mut b = boundary_bindings(10, 2);
    b.insert_field("area_edge", Field::filled([cell()], &[10], 2.0).unwrap());
    let err = Invocation::<f64>::new(boundary_update())
        .out("vn")
        .execute(&mut b, &OffsetProvider::new())
        .unwrap_err();
    assert!(matches!(err, EvalError::DimensionMismatch { .. }));
}

#[test]
fn unbound_scalar_is_rejected() {
    let mut b = boundary_bindings(10, 2);
    let mut without_scalar = Bindings::new();
    for name in ["vn", "z_nabla2_e", "area_edge"] {
        without_scalar.insert_field(name, b.remove_field(name).unwrap());
    }
    let err = Invocation::<f64>::new(boundary_update())
        .out("vn")
        .execute(&mut without_scalar, &OffsetProvider::new())
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::UnboundArgument {
            param: "fac_bdydiff_v".into()
        }
    );
}

/// Writes only even entities; odd ones must keep the caller's values.
struct EvenOnly {
    signature: Signature,
}

impl FieldOperator<f64> for EvenOnly {
    fn name(&self) -> &str {
        "even_only"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, f64>) -> Result<(), EvalError> {
        for h in ctx.range().filter(|h| h % 2 == 0) {
            ctx.staging().write_at(h, 0, -1.0)?;
        }
        Ok(())
    }
}

#[test]
fn custom_operator_leaves_unwritten_points_unchanged() {
    let op = EvenOnly {
        signature: Signature::builder().output([cell()]).build().unwrap(),
    };
    let mut b = Bindings::new().with_field("out", Field::new([cell()], &[4], vec![1.0, 2.0, 3.0, 4.0]).unwrap());

    call(&op, &mut b, "out", &OffsetProvider::new()).unwrap();

    assert_eq!(b.field("out").unwrap().as_slice(), &[-1.0, 2.0, -1.0, 4.0]);
}

/// Writes its domain, then one entity before it.
struct Overreach {
    signature: Signature,
}

impl FieldOperator<f64> for Overreach {
    fn name(&self) -> &str {
        "overreach"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, f64>) -> Result<(), EvalError> {
        let range = ctx.range();
        for h in range.clone() {
            ctx.staging().write_at(h, 0, 9.0)?;
        }
        ctx.staging().write_at(range.start - 1, 0, 9.0)
    }
}

#[test]
fn write_before_domain_start_fails_without_writing() {
    let op = Overreach {
        signature: Signature::builder().output([cell()]).build().unwrap(),
    };
    let mut b = Bindings::new().with_field("out", Field::new([cell()], &[4], vec![1.0, 2.0, 3.0, 4.0]).unwrap());

    let err = Invocation::<f64>::new(Arc::new(op))
        .out("out")
        .domain(Domain::full().across(2..4))
        .execute(&mut b, &OffsetProvider::new())
        .unwrap_err();

    assert!(matches!(err, EvalError::ExecutionFailed { .. }));
    assert_eq!(b.field("out").unwrap().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn broadcast_vertical_profile_over_cells() {
    let op = ExprOperator::builder("scale")
        .field("x", [cell(), k()])
        .field("profile", [k()])
        .output([cell(), k()])
        .body(field("x") * field("profile"))
        .build()
        .unwrap();
    let mut b = Bindings::new()
        .with_field("x", Field::filled([cell(), k()], &[2, 3], 2.0).unwrap())
        .with_field("profile", Field::new([k()], &[3], vec![1.0, 10.0, 100.0]).unwrap())
        .with_field("y", Field::<f64>::zeros([cell(), k()], &[2, 3]).unwrap());

    Invocation::<f64>::new(Arc::new(op))
        .arg("x", "x")
        .out("y")
        .execute(&mut b, &OffsetProvider::new())
        .unwrap();

    assert_eq!(
        b.field("y").unwrap().as_slice(),
        &[2.0, 20.0, 200.0, 2.0, 20.0, 200.0]
    );
}

#[test]
fn layout_order_of_output_dimensions_does_not_matter() {
    let op = ExprOperator::builder("double")
        .field("x", [cell(), k()])
        .output([cell(), k()])
        .body(2.0 * field("x"))
        .build()
        .unwrap();
    let levels_first: Vec<Dimension> = vec![k(), cell()];
    let mut b = Bindings::new()
        .with_field("x", Field::new(levels_first.clone(), &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap())
        .with_field("y", Field::<f64>::zeros(levels_first, &[2, 3]).unwrap());

    Invocation::<f64>::new(Arc::new(op))
        .out("y")
        .execute(&mut b, &OffsetProvider::new())
        .unwrap();

    assert_eq!(
        b.field("y").unwrap().as_slice(),
        &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]
    );
}

proptest! {
    #[test]
    fn points_outside_the_domain_are_bit_identical(
        start in 0usize..64,
        len in 0usize..64,
        seed in any::<u64>(),
    ) {
        let (edges, levels) = (128, 2);
        let end = start + len;
        let mut b = boundary_bindings(edges, levels);
        b.insert_field("vn", random_field([edge(), k()], &[edges, levels], seed).unwrap());
        let before = b.field("vn").unwrap().clone();

        Invocation::<f64>::new(boundary_update())
            .out("vn")
            .domain(Domain::full().across(start..end))
            .execute(&mut b, &OffsetProvider::new())
            .unwrap();

        let after = b.field("vn").unwrap();
        for e in 0..edges {
            for lvl in 0..levels {
                let (old, new) = (before.get(&[e, lvl]).unwrap(), after.get(&[e, lvl]).unwrap());
                if (start..end).contains(&e) {
                    prop_assert_eq!(new, old + 10.0);
                } else {
                    prop_assert_eq!(new.to_bits(), old.to_bits());
                }
            }
        }
    }
}
