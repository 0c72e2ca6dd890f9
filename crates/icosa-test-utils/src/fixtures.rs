//! Mock operators for program and invocation tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use icosa_core::{Dimension, Element, EvalError};
use icosa_operator::{EvalContext, FieldOperator, Signature};

/// Copies its `input` parameter into the output.
pub struct CopyOperator {
    pub name: String,
    signature: Signature,
}

impl CopyOperator {
    /// Copy fields of dimensions `dims`.
    pub fn new(
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension> + Clone,
    ) -> Result<Self, EvalError> {
        let signature = Signature::builder()
            .field("input", dims.clone())
            .output(dims)
            .build()?;
        Ok(Self {
            name: name.into(),
            signature,
        })
    }
}

impl<T: Element> FieldOperator<T> for CopyOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, T>) -> Result<(), EvalError> {
        let input = ctx.field("input")?;
        let (strides, data) = (input.strides(), input.as_slice());
        let levels = ctx.levels();
        for h in ctx.range() {
            for k in 0..levels {
                ctx.staging().write_at(h, k, data[strides.offset(h, k, 0)])?;
            }
        }
        Ok(())
    }
}

/// Fills its domain with a constant.
pub struct ConstOperator {
    pub name: String,
    pub value: f64,
    signature: Signature,
}

impl ConstOperator {
    /// Fill outputs of dimensions `dims` with `value`.
    pub fn new(
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
        value: f64,
    ) -> Result<Self, EvalError> {
        Ok(Self {
            name: name.into(),
            value,
            signature: Signature::builder().output(dims).build()?,
        })
    }
}

impl<T: Element> FieldOperator<T> for ConstOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, T>) -> Result<(), EvalError> {
        ctx.staging().as_mut_slice().fill(T::from_f64(self.value));
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// On success the output is filled with the call index.
pub struct FailingOperator {
    pub name: String,
    pub succeed_count: usize,
    signature: Signature,
    call_count: AtomicUsize,
}

impl FailingOperator {
    /// An operator that succeeds `succeed_count` times then fails.
    pub fn new(
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
        succeed_count: usize,
    ) -> Result<Self, EvalError> {
        Ok(Self {
            name: name.into(),
            succeed_count,
            signature: Signature::builder().output(dims).build()?,
            call_count: AtomicUsize::new(0),
        })
    }

    /// How many times `evaluate()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl<T: Element> FieldOperator<T> for FailingOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_, T>) -> Result<(), EvalError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(EvalError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        ctx.staging().as_mut_slice().fill(T::from_f64(n as f64));
        Ok(())
    }
}
