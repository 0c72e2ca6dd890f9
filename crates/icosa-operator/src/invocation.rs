//! Binding an operator to caller storage and running it.
//!
//! An [`Invocation`] names which bindings feed each operator parameter,
//! which binding receives the output, and the active [`Domain`]. Execution
//! follows a fixed order so that every check happens before the output
//! field is touched:
//!
//! 1. resolve every offset the operator uses
//! 2. bind and check the output field
//! 3. resolve the horizontal domain against the output extent
//! 4. bind and check every argument
//! 5. evaluate into a staging buffer
//! 6. commit the staging buffer into the output

use std::ops::Range;
use std::sync::Arc;

use icosa_core::{format_dims, Element, EvalError};
use icosa_field::{Bindings, Field};
use icosa_mesh::{Domain, OffsetProvider};
use indexmap::IndexMap;
use tracing::trace;

use crate::context::EvalContext;
use crate::operator::FieldOperator;
use crate::signature::same_dims;
use crate::staging::StagingBuffer;

/// One call of an operator: argument routing, output binding and domain.
///
/// Parameters without an explicit [`arg`](Self::arg) mapping read the
/// binding of the same name.
pub struct Invocation<T: Element> {
    op: Arc<dyn FieldOperator<T>>,
    args: IndexMap<String, String>,
    out: Option<String>,
    domain: Domain,
}

impl<T: Element> Clone for Invocation<T> {
    fn clone(&self) -> Self {
        Self {
            op: Arc::clone(&self.op),
            args: self.args.clone(),
            out: self.out.clone(),
            domain: self.domain.clone(),
        }
    }
}

impl<T: Element> std::fmt::Debug for Invocation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("op", &self.op.name())
            .field("args", &self.args)
            .field("out", &self.out)
            .field("domain", &self.domain)
            .finish()
    }
}

impl<T: Element> Invocation<T> {
    /// Invoke `op` over the full domain.
    pub fn new(op: Arc<dyn FieldOperator<T>>) -> Self {
        Self {
            op,
            args: IndexMap::new(),
            out: None,
            domain: Domain::full(),
        }
    }

    /// Feed parameter `param` from binding `binding`.
    pub fn arg(mut self, param: impl Into<String>, binding: impl Into<String>) -> Self {
        self.args.insert(param.into(), binding.into());
        self
    }

    /// Write the result into binding `binding`.
    pub fn out(mut self, binding: impl Into<String>) -> Self {
        self.out = Some(binding.into());
        self
    }

    /// Restrict evaluation to `domain`.
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// The operator.
    pub fn operator(&self) -> &dyn FieldOperator<T> {
        self.op.as_ref()
    }

    /// The operator's name.
    pub fn name(&self) -> &str {
        self.op.name()
    }

    /// The output binding, if set.
    pub fn output(&self) -> Option<&str> {
        self.out.as_deref()
    }

    /// The active domain.
    pub fn active_domain(&self) -> &Domain {
        &self.domain
    }

    /// Binding name that feeds `param`.
    pub fn binding_for<'s>(&'s self, param: &'s str) -> &'s str {
        self.args.get(param).map_or(param, String::as_str)
    }

    /// Binding names of the field arguments, in parameter order.
    pub fn field_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.op
            .signature()
            .params()
            .fields()
            .map(|(p, _)| (p, self.binding_for(p)))
    }

    /// Binding names of the scalar arguments, in parameter order.
    pub fn scalar_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.op
            .signature()
            .params()
            .scalars()
            .map(|p| (p, self.binding_for(p)))
    }

    /// Run against `bindings`.
    ///
    /// On error nothing has been written.
    pub fn execute(
        &self,
        bindings: &mut Bindings<T>,
        provider: &OffsetProvider,
    ) -> Result<(), EvalError> {
        let out = self.out.as_deref().ok_or_else(|| EvalError::UnboundArgument {
            param: "out".to_string(),
        })?;
        run(self.op.as_ref(), &self.args, out, &self.domain, bindings, provider)
    }
}

/// Run `op` over the full domain, reading each parameter from the binding
/// of the same name and writing into `out`.
pub fn call<T: Element>(
    op: &dyn FieldOperator<T>,
    bindings: &mut Bindings<T>,
    out: &str,
    provider: &OffsetProvider,
) -> Result<(), EvalError> {
    run(op, &IndexMap::new(), out, &Domain::full(), bindings, provider)
}

fn run<T: Element>(
    op: &dyn FieldOperator<T>,
    args: &IndexMap<String, String>,
    out: &str,
    domain: &Domain,
    bindings: &mut Bindings<T>,
    provider: &OffsetProvider,
) -> Result<(), EvalError> {
    for offset in op.offsets() {
        provider.resolve(offset)?;
    }

    let sig = op.signature();
    let binding = |param: &str| args.get(param).cloned().unwrap_or_else(|| param.to_string());

    let out_field = bindings
        .field(out)
        .ok_or_else(|| EvalError::UnboundArgument {
            param: out.to_string(),
        })?;
    if !same_dims(out_field.dims(), sig.output()) {
        return Err(EvalError::Shape {
            field: out.to_string(),
            reason: format!(
                "operator '{}' produces {} but the output field is {}",
                op.name(),
                format_dims(sig.output()),
                out_field.dims_label()
            ),
        });
    }
    let extent = out_field.horizontal_extent().unwrap_or(0);
    let levels = out_field.vertical_extent().unwrap_or(1);
    let range = domain.resolve(extent).map_err(|e| EvalError::Shape {
        field: out.to_string(),
        reason: e.to_string(),
    })?;

    let mut fields: IndexMap<String, &Field<T>> = IndexMap::new();
    for (param, dims) in sig.params().fields() {
        let name = binding(param);
        let f = bindings
            .field(&name)
            .ok_or_else(|| EvalError::UnboundArgument {
                param: param.to_string(),
            })?;
        if !same_dims(f.dims(), dims) {
            return Err(EvalError::DimensionMismatch {
                context: format!("argument '{param}' (binding '{name}')"),
                expected: format_dims(dims),
                found: f.dims_label(),
            });
        }
        check_extents(&name, f, out_field)?;
        fields.insert(param.to_string(), f);
    }
    let mut scalars: IndexMap<String, T> = IndexMap::new();
    for param in sig.params().scalars() {
        let value = bindings
            .scalar(&binding(param))
            .ok_or_else(|| EvalError::UnboundArgument {
                param: param.to_string(),
            })?;
        scalars.insert(param.to_string(), value);
    }

    let mut staged = gather(out_field, &range, levels);
    {
        let staging = StagingBuffer::new(&mut staged, range.start, levels, op.name());
        let mut ctx = EvalContext::new(
            fields,
            scalars,
            provider,
            range.clone(),
            domain.direction(),
            staging,
        );
        op.evaluate(&mut ctx)?;
    }

    let out_field = bindings
        .field_mut(out)
        .ok_or_else(|| EvalError::UnboundArgument {
            param: out.to_string(),
        })?;
    commit(out_field, &range, levels, &staged);
    trace!(
        operator = op.name(),
        out,
        start = range.start,
        end = range.end,
        levels,
        "committed staged values"
    );
    Ok(())
}

/// Argument extents along axes shared with the output must agree.
fn check_extents<T: Element>(name: &str, f: &Field<T>, out: &Field<T>) -> Result<(), EvalError> {
    if f.horizontal_dim().is_some() && f.horizontal_dim() == out.horizontal_dim() {
        let (a, b) = (f.horizontal_extent(), out.horizontal_extent());
        if a != b {
            return Err(EvalError::Shape {
                field: name.to_string(),
                reason: format!(
                    "{} entities but the output has {}",
                    a.unwrap_or(0),
                    b.unwrap_or(0)
                ),
            });
        }
    }
    if let (Some(a), Some(b)) = (f.vertical_extent(), out.vertical_extent()) {
        if a != b {
            return Err(EvalError::Shape {
                field: name.to_string(),
                reason: format!("{a} levels but the output has {b}"),
            });
        }
    }
    Ok(())
}

/// Copy the output's current values for the domain into a staging vector.
fn gather<T: Element>(out: &Field<T>, range: &Range<usize>, levels: usize) -> Vec<T> {
    let strides = out.strides();
    let data = out.as_slice();
    let mut staged = Vec::with_capacity(range.len() * levels);
    for h in range.clone() {
        for k in 0..levels {
            staged.push(data[strides.offset(h, k, 0)]);
        }
    }
    staged
}

fn commit<T: Element>(out: &mut Field<T>, range: &Range<usize>, levels: usize, staged: &[T]) {
    let strides = out.strides();
    let data = out.as_mut_slice();
    for (i, h) in range.clone().enumerate() {
        for k in 0..levels {
            data[strides.offset(h, k, 0)] = staged[i * levels + k];
        }
    }
}
