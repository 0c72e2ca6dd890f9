//! Field operators for the icosa stencil engine.
//!
//! An operator computes one output field from input fields and scalars,
//! optionally combining values across mesh neighbours through named
//! offsets. [`ExprOperator`] bodies are written in the small [`expr`]
//! language and checked against their [`Signature`] once, at construction;
//! custom operators implement [`FieldOperator`] directly.
//!
//! An [`Invocation`] binds an operator to caller storage and a [`Domain`]
//! and runs it: every check happens first, results are staged, and the
//! output field is only written once evaluation has succeeded. Points
//! outside the active domain are never written.
//!
//! [`validate_program`] checks an ordered statement list against a
//! program's parameters and produces the [`ExecutionPlan`] that
//! `icosa-engine` executes.
//!
//! [`Domain`]: icosa_mesh::Domain

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod check;
pub mod context;
pub mod expr;
pub mod invocation;
mod kernel;
pub mod operator;
pub mod plan;
pub mod signature;
pub mod staging;

pub use context::EvalContext;
pub use expr::{BinaryOp, Expr};
pub use invocation::{call, Invocation};
pub use operator::{ExprOperator, ExprOperatorBuilder, FieldOperator};
pub use plan::{validate_program, ExecutionPlan, PlanError, ReadSource};
pub use signature::{same_dims, Parameters, Signature, SignatureBuilder};
pub use staging::StagingBuffer;
