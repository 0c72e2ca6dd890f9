//! Error types for the icosa stencil engine.
//!
//! Organized by layer: dimension lists ([`DimensionError`]), a single
//! operator call ([`EvalError`]), and a whole program run
//! ([`ProgramError`]). Every error is raised synchronously at the point of
//! first use.

use std::error::Error;
use std::fmt;

/// Errors from dimension-list and registry validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionError {
    /// The same dimension name appears twice.
    Duplicate {
        /// The repeated name.
        name: String,
    },
    /// More than one dimension of a single kind in one list.
    TooManyOfKind {
        /// The offending list, rendered as `[A, B]`.
        dims: String,
        /// `"horizontal"`, `"vertical"` or `"local"`.
        kind: &'static str,
    },
    /// A local dimension declared with zero arity.
    ZeroArity {
        /// The local dimension's name.
        name: String,
    },
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { name } => write!(f, "dimension '{name}' declared twice"),
            Self::TooManyOfKind { dims, kind } => {
                write!(f, "dimension list {dims} has more than one {kind} dimension")
            }
            Self::ZeroArity { name } => {
                write!(f, "local dimension '{name}' must have a positive arity")
            }
        }
    }
}

impl Error for DimensionError {}

/// Errors from evaluating a single field operator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalError {
    /// A referenced offset has no entry in the offset provider.
    MissingOffsetProvider {
        /// The offset name (e.g. `"E2C"`).
        offset: String,
    },
    /// Dimension tags disagree with what the operator requires.
    DimensionMismatch {
        /// Where the mismatch was found.
        context: String,
        /// What was required.
        expected: String,
        /// What was supplied.
        found: String,
    },
    /// A field's extents do not match the iteration domain.
    Shape {
        /// The field or binding involved.
        field: String,
        /// Description of the mismatch.
        reason: String,
    },
    /// A connectivity entry lies outside `[-1, target_count)`.
    InvalidNeighborIndex {
        /// The offset whose table is malformed.
        offset: String,
        /// Row (origin entity) of the bad entry.
        row: usize,
        /// Neighbour slot of the bad entry.
        slot: usize,
        /// The stored index.
        value: i32,
        /// Number of entities in the neighbour space.
        target_count: usize,
    },
    /// A weighted reduction received the wrong number of weights.
    WeightCount {
        /// The offset being reduced over.
        offset: String,
        /// The offset's arity.
        expected: usize,
        /// Number of weights supplied.
        found: usize,
    },
    /// An operator parameter has no bound argument.
    UnboundArgument {
        /// The parameter name.
        param: String,
    },
    /// A custom operator failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOffsetProvider { offset } => {
                write!(f, "no offset provider bound for '{offset}'")
            }
            Self::DimensionMismatch {
                context,
                expected,
                found,
            } => write!(f, "{context}: expected {expected}, found {found}"),
            Self::Shape { field, reason } => write!(f, "shape error on '{field}': {reason}"),
            Self::InvalidNeighborIndex {
                offset,
                row,
                slot,
                value,
                target_count,
            } => write!(
                f,
                "offset '{offset}' row {row} slot {slot} holds {value}, \
                 outside [-1, {target_count})"
            ),
            Self::WeightCount {
                offset,
                expected,
                found,
            } => write!(
                f,
                "reduction over '{offset}' needs {expected} weights, got {found}"
            ),
            Self::UnboundArgument { param } => write!(f, "parameter '{param}' is not bound"),
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for EvalError {}

/// Errors from running a program.
///
/// Statements that completed before the failure keep their writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramError {
    /// An offset referenced by some statement is missing from the provider.
    /// Raised before any statement runs.
    MissingOffsetProvider {
        /// The offset name.
        offset: String,
        /// First statement that references it.
        statement: String,
    },
    /// A program parameter is unbound or has the wrong dimensions.
    /// Raised before any statement runs.
    InvalidBinding {
        /// The program parameter name.
        binding: String,
        /// The underlying problem.
        reason: EvalError,
    },
    /// A statement failed during evaluation.
    StatementFailed {
        /// Position of the statement in the program.
        index: usize,
        /// Name of the statement's operator.
        name: String,
        /// The underlying evaluation error.
        reason: EvalError,
    },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOffsetProvider { offset, statement } => write!(
                f,
                "no offset provider bound for '{offset}' (needed by '{statement}')"
            ),
            Self::InvalidBinding { binding, reason } => {
                write!(f, "binding '{binding}': {reason}")
            }
            Self::StatementFailed {
                index,
                name,
                reason,
            } => write!(f, "statement {index} ('{name}') failed: {reason}"),
        }
    }
}

impl Error for ProgramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBinding { reason, .. } | Self::StatementFailed { reason, .. } => {
                Some(reason)
            }
            Self::MissingOffsetProvider { .. } => None,
        }
    }
}
