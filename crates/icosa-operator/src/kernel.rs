//! Compiled expression trees and their data-parallel evaluation.
//!
//! Compilation binds every field read to its buffer and strides and every
//! offset to its table, so evaluating a point is a walk over plain slices.
//! The local neighbour dimension only exists as the `slot`/`neighbor` pair
//! carried by [`Point`] while a reduction body is evaluated.

use std::ops::Range;

use icosa_core::{Element, EvalError};
use icosa_field::AxisStrides;
use icosa_mesh::{ConnectivityTable, VerticalDirection};
use rayon::prelude::*;

use crate::context::EvalContext;
use crate::expr::{BinaryOp, Expr};

/// Entities per rayon task; below this the split overhead dominates.
const MIN_ENTITIES_PER_TASK: usize = 64;

#[derive(Clone, Copy, Debug)]
struct Point {
    h: usize,
    k: usize,
    slot: usize,
    neighbor: usize,
}

enum Node<'a, T: Element> {
    Const(T),
    /// Read at the evaluation entity (and slot, for sparse fields).
    Load {
        data: &'a [T],
        strides: AxisStrides,
    },
    /// Read at the current neighbour.
    Gather {
        data: &'a [T],
        strides: AxisStrides,
    },
    Neg(Box<Node<'a, T>>),
    Binary {
        op: BinaryOp,
        lhs: Box<Node<'a, T>>,
        rhs: Box<Node<'a, T>>,
    },
    Reduce {
        table: &'a ConnectivityTable,
        body: Box<Node<'a, T>>,
        weights: Option<Vec<T>>,
    },
}

impl<T: Element> Node<'_, T> {
    fn eval(&self, p: Point) -> T {
        match self {
            Node::Const(v) => *v,
            Node::Load { data, strides } => data[strides.offset(p.h, p.k, p.slot)],
            Node::Gather { data, strides } => data[strides.offset(p.neighbor, p.k, 0)],
            Node::Neg(inner) => -inner.eval(p),
            Node::Binary { op, lhs, rhs } => {
                let (a, b) = (lhs.eval(p), rhs.eval(p));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                }
            }
            Node::Reduce {
                table,
                body,
                weights,
            } => {
                let mut acc = T::ZERO;
                for (slot, neighbor) in table.neighbors(p.h) {
                    let v = body.eval(Point {
                        slot,
                        neighbor,
                        ..p
                    });
                    acc += match weights {
                        Some(w) => w[slot] * v,
                        None => v,
                    };
                }
                acc
            }
        }
    }
}

/// An operator body bound to the buffers and tables of one call.
pub(crate) struct Kernel<'a, T: Element> {
    root: Node<'a, T>,
}

impl<'a, T: Element> Kernel<'a, T> {
    /// Bind `expr` to the arguments in `ctx`.
    ///
    /// Resolves every offset, checks sparse extents and table coverage of
    /// the active range, and rejects connectivity entries outside the
    /// target field.
    pub(crate) fn compile(expr: &Expr, ctx: &EvalContext<'a, T>) -> Result<Self, EvalError> {
        let root = compile_node(expr, ctx, &ctx.range(), None)?;
        Ok(Self { root })
    }

    /// Evaluate every point of the domain into `out`, laid out
    /// `[(h - start) * levels + k]`.
    pub(crate) fn run(
        &self,
        out: &mut [T],
        start: usize,
        levels: usize,
        direction: VerticalDirection,
    ) {
        if levels == 0 || out.is_empty() {
            return;
        }
        out.par_chunks_mut(levels)
            .with_min_len(MIN_ENTITIES_PER_TASK)
            .enumerate()
            .for_each(|(i, column)| {
                let h = start + i;
                for step in 0..levels {
                    let k = direction.level(step, levels);
                    column[k] = self.root.eval(Point {
                        h,
                        k,
                        slot: 0,
                        neighbor: h,
                    });
                }
            });
    }
}

fn compile_node<'a, T: Element>(
    expr: &Expr,
    ctx: &EvalContext<'a, T>,
    range: &Range<usize>,
    reduce: Option<&'a ConnectivityTable>,
) -> Result<Node<'a, T>, EvalError> {
    Ok(match expr {
        Expr::Literal(v) => Node::Const(T::from_f64(*v)),
        Expr::Scalar(name) => Node::Const(ctx.scalar(name)?),
        Expr::Field(name) => {
            let f = ctx.field(name)?;
            if let (Some(extent), Some(table)) = (f.local_extent(), reduce) {
                if extent != table.arity() {
                    return Err(EvalError::Shape {
                        field: name.clone(),
                        reason: format!(
                            "local extent {extent} differs from offset arity {}",
                            table.arity()
                        ),
                    });
                }
            }
            Node::Load {
                data: f.as_slice(),
                strides: f.strides(),
            }
        }
        Expr::Shift { field, offset } => {
            let f = ctx.field(field)?;
            let table = ctx.provider().resolve(offset)?;
            let target_count = f.horizontal_extent().unwrap_or(0);
            if let Some(bad) = table.first_out_of_range(range.clone(), target_count) {
                return Err(EvalError::InvalidNeighborIndex {
                    offset: offset.name().to_string(),
                    row: bad.row,
                    slot: bad.slot,
                    value: bad.value,
                    target_count,
                });
            }
            Node::Gather {
                data: f.as_slice(),
                strides: f.strides(),
            }
        }
        Expr::Neg(inner) => Node::Neg(Box::new(compile_node(inner, ctx, range, reduce)?)),
        Expr::Binary { op, lhs, rhs } => Node::Binary {
            op: *op,
            lhs: Box::new(compile_node(lhs, ctx, range, reduce)?),
            rhs: Box::new(compile_node(rhs, ctx, range, reduce)?),
        },
        Expr::Reduce {
            offset,
            body,
            weights,
        } => {
            let table = ctx.provider().resolve(offset)?;
            if table.rows() < range.end {
                return Err(EvalError::Shape {
                    field: offset.name().to_string(),
                    reason: format!(
                        "table has {} rows but the domain ends at {}",
                        table.rows(),
                        range.end
                    ),
                });
            }
            Node::Reduce {
                table,
                body: Box::new(compile_node(body, ctx, range, Some(table))?),
                weights: weights
                    .as_ref()
                    .map(|w| w.iter().map(|&x| T::from_f64(x)).collect()),
            }
        }
    })
}
