//! The [`FieldOperator`] trait and the expression-backed [`ExprOperator`].

use icosa_core::{Dimension, Element, EvalError};
use icosa_mesh::Offset;

use crate::check::check_body;
use crate::context::EvalContext;
use crate::expr::Expr;
use crate::kernel::Kernel;
use crate::signature::{Signature, SignatureBuilder};

/// A pure computation producing one output field from fields and scalars.
///
/// # Contract
///
/// - `evaluate()` must be deterministic and must write every point of the
///   active domain into the context's staging buffer.
/// - `signature()` and `offsets()` describe the operator statically; the
///   invocation uses them to bind and check arguments before `evaluate()`
///   runs.
///
/// # Examples
///
/// A custom operator that fills its domain with a constant:
///
/// ```
/// use icosa_core::{Dimension, EvalError, HorizontalKind};
/// use icosa_operator::{EvalContext, FieldOperator, Signature};
///
/// struct Fill {
///     signature: Signature,
///     value: f64,
/// }
///
/// impl FieldOperator<f64> for Fill {
///     fn name(&self) -> &str { "fill" }
///
///     fn signature(&self) -> &Signature { &self.signature }
///
///     fn evaluate(&self, ctx: &mut EvalContext<'_, f64>) -> Result<(), EvalError> {
///         ctx.staging().as_mut_slice().fill(self.value);
///         Ok(())
///     }
/// }
///
/// let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
/// let fill = Fill {
///     signature: Signature::builder().output([cell]).build().unwrap(),
///     value: 1.5,
/// };
/// assert_eq!(fill.name(), "fill");
/// assert!(fill.offsets().is_empty());
/// ```
pub trait FieldOperator<T: Element>: Send + Sync {
    /// Name for error reporting and logging.
    fn name(&self) -> &str;

    /// Parameters and output dimensions.
    fn signature(&self) -> &Signature;

    /// Offsets that must be bound in the provider for every call.
    fn offsets(&self) -> &[Offset] {
        &[]
    }

    /// Compute the active domain into `ctx.staging()`.
    fn evaluate(&self, ctx: &mut EvalContext<'_, T>) -> Result<(), EvalError>;
}

/// An operator whose body is an [`Expr`], checked once at construction.
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
/// use icosa_operator::expr::field;
/// use icosa_operator::ExprOperator;
///
/// let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
/// let add = ExprOperator::builder("add")
///     .field("a", [cell.clone()])
///     .field("b", [cell.clone()])
///     .output([cell])
///     .body(field("a") + field("b"))
///     .build()
///     .unwrap();
/// assert_eq!(add.name(), "add");
/// assert!(add.offsets().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct ExprOperator {
    name: String,
    signature: Signature,
    body: Expr,
    offsets: Vec<Offset>,
}

impl ExprOperator {
    /// Start building an operator called `name`.
    pub fn builder(name: impl Into<String>) -> ExprOperatorBuilder {
        ExprOperatorBuilder {
            name: name.into(),
            signature: Signature::builder(),
            body: None,
        }
    }

    /// Operator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters and output dimensions.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Offsets used by the body, in first-use order.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// The body expression.
    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl<T: Element> FieldOperator<T> for ExprOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, T>) -> Result<(), EvalError> {
        let kernel = Kernel::compile(&self.body, ctx)?;
        let start = ctx.range().start;
        let levels = ctx.levels();
        let direction = ctx.direction();
        kernel.run(ctx.staging().as_mut_slice(), start, levels, direction);
        Ok(())
    }
}

/// Builder for [`ExprOperator`].
#[derive(Clone, Debug)]
pub struct ExprOperatorBuilder {
    name: String,
    signature: SignatureBuilder,
    body: Option<Expr>,
}

impl ExprOperatorBuilder {
    /// Declare a field parameter.
    pub fn field(
        mut self,
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
    ) -> Self {
        self.signature = self.signature.field(name, dims);
        self
    }

    /// Declare a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.signature = self.signature.scalar(name);
        self
    }

    /// Set the output dimensions (required).
    pub fn output(mut self, dims: impl IntoIterator<Item = Dimension>) -> Self {
        self.signature = self.signature.output(dims);
        self
    }

    /// Set the body (required).
    pub fn body(mut self, body: Expr) -> Self {
        self.body = Some(body);
        self
    }

    /// Validate the signature, type-check the body and build.
    pub fn build(self) -> Result<ExprOperator, EvalError> {
        let signature = self.signature.build()?;
        let body = self.body.ok_or_else(|| EvalError::ExecutionFailed {
            reason: format!("operator '{}' has no body", self.name),
        })?;
        let offsets = check_body(&body, &signature)?;
        Ok(ExprOperator {
            name: self.name,
            signature,
            body,
            offsets,
        })
    }
}
