//! Ordered, barrier-sequenced operator programs.
//!
//! A [`Program`] owns its statement list and the [`ExecutionPlan`] built
//! from it. [`Program::run`] executes the statements one after another
//! against caller-owned [`Bindings`]; statement `i + 1` starts only after
//! statement `i` has committed its output, so aliasing a binding across
//! statements is how later statements see earlier results.

use std::time::Instant;

use icosa_core::{format_dims, Dimension, Element, EvalError, ProgramError};
use icosa_field::Bindings;
use icosa_mesh::{Domain, OffsetProvider};
use icosa_operator::{
    same_dims, validate_program, ExecutionPlan, Invocation, Parameters, PlanError,
};
use tracing::{debug, warn};

use crate::metrics::RunMetrics;

// ── Program ────────────────────────────────────────────────────────

/// A validated, ordered list of operator invocations.
pub struct Program<T: Element> {
    name: String,
    params: Parameters,
    statements: Vec<Invocation<T>>,
    plan: ExecutionPlan,
}

impl<T: Element> std::fmt::Debug for Program<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("statements", &self.statements)
            .finish_non_exhaustive()
    }
}

impl<T: Element> Program<T> {
    /// Start building a program called `name`.
    pub fn builder(name: impl Into<String>) -> ProgramBuilder<T> {
        ProgramBuilder {
            name: name.into(),
            params: Parameters::new(),
            statements: Vec::new(),
            error: None,
        }
    }

    /// The program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Statements in execution order.
    pub fn statements(&self) -> &[Invocation<T>] {
        &self.statements
    }

    /// The read-routing plan computed at build time.
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Run every statement in order against `bindings`.
    ///
    /// Before the first statement, every offset referenced anywhere in the
    /// program must resolve in `provider`, and every declared parameter
    /// must be bound with matching dimensions; a failure there leaves
    /// `bindings` untouched. If a statement fails, the statements before it
    /// keep their writes and the failing statement writes nothing.
    pub fn run(
        &self,
        bindings: &mut Bindings<T>,
        provider: &OffsetProvider,
    ) -> Result<RunMetrics, ProgramError> {
        let run_start = Instant::now();
        self.check_offsets(provider)?;
        self.check_bindings(bindings)?;
        let validation_us = run_start.elapsed().as_micros() as u64;

        let mut statement_us = Vec::with_capacity(self.statements.len());
        for (index, stmt) in self.statements.iter().enumerate() {
            debug!(
                program = %self.name,
                index,
                statement = stmt.name(),
                domain = %stmt.active_domain(),
                "dispatching statement"
            );
            let stmt_start = Instant::now();
            if let Err(reason) = stmt.execute(bindings, provider) {
                warn!(
                    program = %self.name,
                    index,
                    statement = stmt.name(),
                    error = %reason,
                    "statement failed; earlier writes are kept"
                );
                return Err(ProgramError::StatementFailed {
                    index,
                    name: stmt.name().to_string(),
                    reason,
                });
            }
            statement_us.push((
                stmt.name().to_string(),
                stmt_start.elapsed().as_micros() as u64,
            ));
        }

        Ok(RunMetrics {
            total_us: run_start.elapsed().as_micros() as u64,
            validation_us,
            statement_us,
        })
    }

    fn check_offsets(&self, provider: &OffsetProvider) -> Result<(), ProgramError> {
        for (offset, first) in self.plan.offset_uses() {
            match provider.resolve(offset) {
                Ok(_) => {}
                Err(EvalError::MissingOffsetProvider { offset }) => {
                    let statement = self
                        .statements
                        .get(first)
                        .map(|s| s.name().to_string())
                        .unwrap_or_default();
                    return Err(ProgramError::MissingOffsetProvider { offset, statement });
                }
                Err(reason) => {
                    return Err(ProgramError::InvalidBinding {
                        binding: offset.name().to_string(),
                        reason,
                    })
                }
            }
        }
        Ok(())
    }

    fn check_bindings(&self, bindings: &Bindings<T>) -> Result<(), ProgramError> {
        for (name, dims) in self.params.fields() {
            let field = bindings.field(name).ok_or_else(|| unbound(name))?;
            if !same_dims(field.dims(), dims) {
                return Err(ProgramError::InvalidBinding {
                    binding: name.to_string(),
                    reason: EvalError::DimensionMismatch {
                        context: format!("program '{}' parameter", self.name),
                        expected: format_dims(dims),
                        found: field.dims_label(),
                    },
                });
            }
        }
        for name in self.params.scalars() {
            if bindings.scalar(name).is_none() {
                return Err(unbound(name));
            }
        }
        Ok(())
    }
}

fn unbound(name: &str) -> ProgramError {
    ProgramError::InvalidBinding {
        binding: name.to_string(),
        reason: EvalError::UnboundArgument {
            param: name.to_string(),
        },
    }
}

// ── ProgramBuilder ─────────────────────────────────────────────────

/// Builder for [`Program`]. Validation happens in [`build`](Self::build).
pub struct ProgramBuilder<T: Element> {
    name: String,
    params: Parameters,
    statements: Vec<Invocation<T>>,
    error: Option<PlanError>,
}

impl<T: Element> ProgramBuilder<T> {
    /// Declare a field parameter.
    pub fn field(
        mut self,
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
    ) -> Self {
        let name = name.into();
        if let Err(reason) = self.params.add_field(name.clone(), dims) {
            self.error.get_or_insert(PlanError::InvalidParameter { name, reason });
        }
        self
    }

    /// Declare a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Err(reason) = self.params.add_scalar(name.clone()) {
            self.error.get_or_insert(PlanError::InvalidParameter { name, reason });
        }
        self
    }

    /// Append a statement.
    pub fn statement(mut self, stmt: Invocation<T>) -> Self {
        self.statements.push(stmt);
        self
    }

    /// Append several statements sharing one domain.
    pub fn with_domain(
        mut self,
        domain: Domain,
        stmts: impl IntoIterator<Item = Invocation<T>>,
    ) -> Self {
        self.statements
            .extend(stmts.into_iter().map(|s| s.domain(domain.clone())));
        self
    }

    /// Validate the statements against the declared parameters.
    pub fn build(self) -> Result<Program<T>, PlanError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let plan = validate_program(&self.statements, &self.params)?;
        Ok(Program {
            name: self.name,
            params: self.params,
            statements: self.statements,
            plan,
        })
    }
}
