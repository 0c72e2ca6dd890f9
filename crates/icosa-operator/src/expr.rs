//! The expression language of field operator bodies.
//!
//! An [`Expr`] is evaluated once per point of the output's iteration domain.
//! Field reads are resolved against the point: a field on the output's
//! horizontal dimension is read at the current entity, a field without a
//! horizontal dimension broadcasts, and a field reached through
//! [`shift`] is read at a neighbour. Shifts only make sense inside a
//! reduction over the same offset, which supplies the neighbour slot.
//!
//! ```
//! use icosa_core::{Dimension, HorizontalKind};
//! use icosa_mesh::Offset;
//! use icosa_operator::expr::{field, neighbor_sum, scalar, shift};
//!
//! let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
//! let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
//! let e2c = Offset::new("E2C", cell, (edge, Dimension::local("E2CDim", 2))).unwrap();
//!
//! let body = neighbor_sum(shift("cell_values", &e2c), &e2c) * scalar("scale") + field("bias");
//! assert_eq!(body.offsets().len(), 1);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use icosa_mesh::Offset;

/// Element-wise binary arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Sub,
    /// `lhs * rhs`
    Mul,
    /// `lhs / rhs`
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        })
    }
}

/// A node of an operator body.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Read a field parameter at the current point.
    Field(String),
    /// A scalar parameter.
    Scalar(String),
    /// A constant, converted to the working precision at call time.
    Literal(f64),
    /// Negation.
    Neg(Box<Expr>),
    /// Element-wise arithmetic.
    Binary {
        /// Operation.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Read a field parameter at the neighbour selected by the enclosing
    /// reduction over `offset`.
    Shift {
        /// Field parameter name.
        field: String,
        /// Relation to follow.
        offset: Offset,
    },
    /// Sum `body` over the valid neighbour slots of `offset`.
    Reduce {
        /// Relation whose slots are summed.
        offset: Offset,
        /// Per-slot value.
        body: Box<Expr>,
        /// Optional per-slot weights, one per slot of the offset.
        weights: Option<Vec<f64>>,
    },
}

impl Expr {
    /// Distinct offsets referenced anywhere in the expression, in first-use
    /// order.
    pub fn offsets(&self) -> Vec<&Offset> {
        let mut out: Vec<&Offset> = Vec::new();
        self.visit(&mut |e| {
            let offset = match e {
                Expr::Shift { offset, .. } | Expr::Reduce { offset, .. } => offset,
                _ => return,
            };
            if !out.iter().any(|o| o.name() == offset.name()) {
                out.push(offset);
            }
        });
        out
    }

    /// Distinct field parameter names read by the expression.
    pub fn field_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.visit(&mut |e| {
            if let Expr::Field(name) | Expr::Shift { field: name, .. } = e {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        });
        out
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Neg(inner) => inner.visit(f),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            Expr::Reduce { body, .. } => body.visit(f),
            Expr::Field(_) | Expr::Scalar(_) | Expr::Literal(_) | Expr::Shift { .. } => {}
        }
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) | Expr::Scalar(name) => f.write_str(name),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Neg(inner) => write!(f, "-({inner})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Shift { field, offset } => write!(f, "{field}({})", offset.name()),
            Expr::Reduce {
                offset,
                body,
                weights: None,
            } => write!(f, "neighbor_sum({body}, {})", offset.name()),
            Expr::Reduce {
                offset,
                body,
                weights: Some(w),
            } => write!(f, "sum_over({body}, {}, {w:?})", offset.name()),
        }
    }
}

// ── Constructors ───────────────────────────────────────────────────

/// Read a field parameter.
pub fn field(name: impl Into<String>) -> Expr {
    Expr::Field(name.into())
}

/// Read a scalar parameter.
pub fn scalar(name: impl Into<String>) -> Expr {
    Expr::Scalar(name.into())
}

/// A constant.
pub fn lit(value: f64) -> Expr {
    Expr::Literal(value)
}

/// Read `name` through `offset` (the `field(E2C)` indexing step).
pub fn shift(name: impl Into<String>, offset: &Offset) -> Expr {
    Expr::Shift {
        field: name.into(),
        offset: offset.clone(),
    }
}

/// Unweighted sum of `body` over the valid slots of `offset`.
pub fn neighbor_sum(body: Expr, offset: &Offset) -> Expr {
    Expr::Reduce {
        offset: offset.clone(),
        body: Box::new(body),
        weights: None,
    }
}

/// Weighted sum of `body` over the valid slots of `offset`.
///
/// `weights[j]` multiplies slot `j`; weights of sentinel slots are never
/// read.
pub fn sum_over(body: Expr, offset: &Offset, weights: impl Into<Vec<f64>>) -> Expr {
    Expr::Reduce {
        offset: offset.clone(),
        body: Box::new(body),
        weights: Some(weights.into()),
    }
}

// ── Operators ──────────────────────────────────────────────────────

macro_rules! impl_binary {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, Expr::Literal(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, Expr::Literal(self), rhs)
            }
        }
    };
}

impl_binary!(Add, add, BinaryOp::Add);
impl_binary!(Sub, sub, BinaryOp::Sub);
impl_binary!(Mul, mul, BinaryOp::Mul);
impl_binary!(Div, div, BinaryOp::Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icosa_core::{Dimension, HorizontalKind};

    fn e2c() -> Offset {
        Offset::new(
            "E2C",
            Dimension::horizontal("Cell", HorizontalKind::Cell),
            (
                Dimension::horizontal("Edge", HorizontalKind::Edge),
                Dimension::local("E2CDim", 2),
            ),
        )
        .unwrap()
    }

    #[test]
    fn operators_build_binary_nodes() {
        let e = field("a") + field("b") * 2.0;
        assert_eq!(e.to_string(), "(a + (b * 2))");
        let e = 1.0 - -field("a");
        assert_eq!(e.to_string(), "(1 - -(a))");
    }

    #[test]
    fn offsets_are_deduplicated() {
        let o = e2c();
        let e = neighbor_sum(shift("x", &o), &o) + sum_over(shift("y", &o), &o, [-1.0, 1.0]);
        let names: Vec<&str> = e.offsets().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["E2C"]);
    }

    #[test]
    fn field_names_cover_shifts() {
        let o = e2c();
        let e = field("a") * neighbor_sum(shift("b", &o) * field("a"), &o);
        assert_eq!(e.field_names(), vec!["a", "b"]);
    }

    #[test]
    fn display_reductions() {
        let o = e2c();
        assert_eq!(
            neighbor_sum(shift("c", &o), &o).to_string(),
            "neighbor_sum(c(E2C), E2C)"
        );
        assert_eq!(
            sum_over(shift("c", &o), &o, vec![-1.0, 1.0]).to_string(),
            "sum_over(c(E2C), E2C, [-1.0, 1.0])"
        );
    }
}
