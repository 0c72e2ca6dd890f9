//! Execution context passed to operators during evaluation.

use std::ops::Range;

use icosa_core::{Element, EvalError};
use icosa_field::Field;
use icosa_mesh::{OffsetProvider, VerticalDirection};
use indexmap::IndexMap;

use crate::staging::StagingBuffer;

/// Everything an operator sees during one call.
///
/// Arguments are keyed by *parameter* name; the invocation has already
/// mapped caller binding names onto parameters and checked dimensions and
/// extents. Results go to [`staging`](Self::staging), never to the output
/// field directly.
pub struct EvalContext<'a, T: Element> {
    fields: IndexMap<String, &'a Field<T>>,
    scalars: IndexMap<String, T>,
    provider: &'a OffsetProvider,
    range: Range<usize>,
    direction: VerticalDirection,
    staging: StagingBuffer<'a, T>,
}

impl<'a, T: Element> EvalContext<'a, T> {
    /// Construct a context.
    ///
    /// Typically called by the invocation, not by operators directly.
    pub fn new(
        fields: IndexMap<String, &'a Field<T>>,
        scalars: IndexMap<String, T>,
        provider: &'a OffsetProvider,
        range: Range<usize>,
        direction: VerticalDirection,
        staging: StagingBuffer<'a, T>,
    ) -> Self {
        Self {
            fields,
            scalars,
            provider,
            range,
            direction,
            staging,
        }
    }

    /// The field bound to parameter `param`.
    pub fn field(&self, param: &str) -> Result<&'a Field<T>, EvalError> {
        self.fields
            .get(param)
            .copied()
            .ok_or_else(|| EvalError::UnboundArgument {
                param: param.to_string(),
            })
    }

    /// The scalar bound to parameter `param`.
    pub fn scalar(&self, param: &str) -> Result<T, EvalError> {
        self.scalars
            .get(param)
            .copied()
            .ok_or_else(|| EvalError::UnboundArgument {
                param: param.to_string(),
            })
    }

    /// Offset tables for this call.
    pub fn provider(&self) -> &'a OffsetProvider {
        self.provider
    }

    /// Active horizontal range.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Vertical levels of the output (1 for a level-less output).
    pub fn levels(&self) -> usize {
        self.staging.levels()
    }

    /// Vertical traversal order.
    pub fn direction(&self) -> VerticalDirection {
        self.direction
    }

    /// Result buffer for the active domain.
    pub fn staging(&mut self) -> &mut StagingBuffer<'a, T> {
        &mut self.staging
    }
}
