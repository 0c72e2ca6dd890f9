//! Program validation and read routing.
//!
//! [`validate_program`] runs once when a program is built. It checks every
//! statement against the program's declared parameters and records, for each
//! field a statement reads, whether the value comes from the caller or from
//! an earlier statement's output. It also records each offset the program
//! uses and the first statement using it; programs resolve those against
//! the provider before any statement runs.

use std::error::Error;
use std::fmt;

use icosa_core::{format_dims, Dimension, Element, EvalError};
use icosa_mesh::Offset;
use indexmap::IndexMap;

use crate::invocation::Invocation;
use crate::signature::{same_dims, Parameters};

// ── Read routing ───────────────────────────────────────────────────

/// Where a statement's field argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// The value the caller bound before the run.
    Caller,
    /// The output of an earlier statement.
    Statement {
        /// Index of the last statement writing the binding.
        writer_index: usize,
    },
}

/// Per-statement routing of reads plus the offsets the program needs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExecutionPlan {
    /// `routes[statement]` maps binding name to its source.
    routes: Vec<IndexMap<String, ReadSource>>,
    /// `outputs[statement]` is the binding the statement writes.
    outputs: Vec<String>,
    /// Each distinct offset declaration and the first statement using it.
    offsets: IndexMap<Offset, usize>,
}

impl ExecutionPlan {
    /// Number of statements.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the plan has no statements.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Source of `binding` as read by `statement`.
    pub fn source(&self, statement: usize, binding: &str) -> Option<ReadSource> {
        self.routes.get(statement)?.get(binding).copied()
    }

    /// All `(binding, source)` pairs read by a statement.
    pub fn routes_for(&self, statement: usize) -> Option<&IndexMap<String, ReadSource>> {
        self.routes.get(statement)
    }

    /// Binding written by a statement.
    pub fn output(&self, statement: usize) -> Option<&str> {
        self.outputs.get(statement).map(String::as_str)
    }

    /// Index of the last statement writing `binding`.
    pub fn final_writer(&self, binding: &str) -> Option<usize> {
        self.outputs.iter().rposition(|o| o == binding)
    }

    /// Every offset the program uses, by name, with the first statement
    /// using it.
    pub fn offsets(&self) -> impl Iterator<Item = (&str, usize)> {
        self.offsets.iter().map(|(o, &i)| (o.name(), i))
    }

    /// Every distinct offset declaration with the first statement using it.
    ///
    /// Programs resolve these against the provider before running anything.
    pub fn offset_uses(&self) -> impl Iterator<Item = (&Offset, usize)> {
        self.offsets.iter().map(|(o, &i)| (o, i))
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from program validation (build time, not per run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// No statements.
    EmptyProgram,
    /// A program parameter is declared twice or has an invalid dimension
    /// list.
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The underlying problem.
        reason: EvalError,
    },
    /// A statement has no output binding.
    MissingOutput {
        /// Statement index.
        statement: usize,
        /// Operator name.
        name: String,
    },
    /// A statement uses a binding the program does not declare, or uses a
    /// scalar binding as a field (or the reverse).
    UndeclaredBinding {
        /// Operator name.
        statement: String,
        /// The binding.
        binding: String,
    },
    /// A binding's declared dimensions differ from the operator's.
    BindingMismatch {
        /// Operator name.
        statement: String,
        /// The binding.
        binding: String,
        /// Dimensions the operator needs.
        expected: String,
        /// Dimensions the program declares.
        found: String,
    },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProgram => write!(f, "program has no statements"),
            Self::InvalidParameter { name, reason } => {
                write!(f, "parameter '{name}': {reason}")
            }
            Self::MissingOutput { statement, name } => {
                write!(f, "statement {statement} ('{name}') has no output binding")
            }
            Self::UndeclaredBinding { statement, binding } => write!(
                f,
                "statement '{statement}' uses undeclared binding '{binding}'"
            ),
            Self::BindingMismatch {
                statement,
                binding,
                expected,
                found,
            } => write!(
                f,
                "statement '{statement}' needs '{binding}' as {expected}, \
                 but the program declares {found}"
            ),
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidParameter { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a statement list against the program parameters and build the
/// [`ExecutionPlan`].
///
/// Checks performed:
///
/// 1. The program is non-empty.
/// 2. Every statement has an output binding, declared as a field with the
///    operator's output dimensions.
/// 3. Every field argument is a declared field with matching dimensions.
/// 4. Every scalar argument is a declared scalar.
///
/// Several statements may write the same binding; later statements read
/// the most recent write.
pub fn validate_program<T: Element>(
    statements: &[Invocation<T>],
    params: &Parameters,
) -> Result<ExecutionPlan, PlanError> {
    if statements.is_empty() {
        return Err(PlanError::EmptyProgram);
    }

    let mut last_writer: IndexMap<String, usize> = IndexMap::new();
    let mut routes = Vec::with_capacity(statements.len());
    let mut outputs = Vec::with_capacity(statements.len());
    let mut offsets: IndexMap<Offset, usize> = IndexMap::new();

    for (i, stmt) in statements.iter().enumerate() {
        let sig = stmt.operator().signature();
        let out = stmt.output().ok_or_else(|| PlanError::MissingOutput {
            statement: i,
            name: stmt.name().to_string(),
        })?;
        check_field(params, stmt.name(), out, sig.output())?;

        let mut stmt_routes = IndexMap::new();
        for (param, binding) in stmt.field_bindings() {
            let needed = sig.params().field(param).unwrap_or_default();
            check_field(params, stmt.name(), binding, needed)?;
            let source = match last_writer.get(binding) {
                Some(&j) => ReadSource::Statement { writer_index: j },
                None => ReadSource::Caller,
            };
            stmt_routes.insert(binding.to_string(), source);
        }
        for (_, binding) in stmt.scalar_bindings() {
            if !params.has_scalar(binding) {
                return Err(PlanError::UndeclaredBinding {
                    statement: stmt.name().to_string(),
                    binding: binding.to_string(),
                });
            }
        }
        for offset in stmt.operator().offsets() {
            offsets.entry(offset.clone()).or_insert(i);
        }

        routes.push(stmt_routes);
        outputs.push(out.to_string());
        last_writer.insert(out.to_string(), i);
    }

    Ok(ExecutionPlan {
        routes,
        outputs,
        offsets,
    })
}

fn check_field(
    params: &Parameters,
    statement: &str,
    binding: &str,
    needed: &[Dimension],
) -> Result<(), PlanError> {
    let declared = params
        .field(binding)
        .ok_or_else(|| PlanError::UndeclaredBinding {
            statement: statement.to_string(),
            binding: binding.to_string(),
        })?;
    if !same_dims(declared, needed) {
        return Err(PlanError::BindingMismatch {
            statement: statement.to_string(),
            binding: binding.to_string(),
            expected: format_dims(needed),
            found: format_dims(declared),
        });
    }
    Ok(())
}
