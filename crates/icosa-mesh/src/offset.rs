//! Named neighbour relations and their per-call table bindings.

use std::borrow::Cow;
use std::sync::Arc;

use icosa_core::{Dimension, EvalError};
use indexmap::IndexMap;
use tracing::trace;

use crate::connectivity::ConnectivityTable;
use crate::error::MeshError;

/// A named, directed neighbour relation.
///
/// `source` is the dimension of fields read through the offset; `target` is
/// the (origin horizontal, local) pair of the evaluation site. For `E2C`,
/// fields on `Cell` are read from an `Edge` site through the `E2CDim` slots:
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
/// use icosa_mesh::Offset;
///
/// let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
/// let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
/// let e2c = Offset::new("E2C", cell, (edge, Dimension::local("E2CDim", 2))).unwrap();
/// assert_eq!(e2c.arity(), 2);
/// assert_eq!(e2c.target().name(), "Edge");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    name: Cow<'static, str>,
    source: Dimension,
    target: Dimension,
    local: Dimension,
}

impl Offset {
    /// Declare an offset.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        source: Dimension,
        target: (Dimension, Dimension),
    ) -> Result<Self, MeshError> {
        let (target, local) = target;
        for dim in [&source, &target] {
            if !dim.is_horizontal() {
                return Err(MeshError::NotHorizontal {
                    dim: dim.name().to_string(),
                });
            }
        }
        if !local.is_local() {
            return Err(MeshError::NotLocal {
                dim: local.name().to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            source,
            target,
            local,
        })
    }

    /// Offset name, the key looked up in an [`OffsetProvider`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension of fields read through this offset.
    pub fn source(&self) -> &Dimension {
        &self.source
    }

    /// Horizontal dimension of the evaluation site.
    pub fn target(&self) -> &Dimension {
        &self.target
    }

    /// The local (neighbour-slot) dimension.
    pub fn local(&self) -> &Dimension {
        &self.local
    }

    /// Number of neighbour slots.
    pub fn arity(&self) -> usize {
        self.local.max_arity().unwrap_or(0)
    }
}

/// Per-call binding from offset names to connectivity tables.
///
/// Tables are shared through `Arc` so one mesh can back many calls without
/// copying; the provider itself carries no state between calls.
#[derive(Clone, Debug, Default)]
pub struct OffsetProvider {
    tables: IndexMap<String, Arc<ConnectivityTable>>,
}

impl OffsetProvider {
    /// An empty provider, valid for operators that use no offsets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, table: impl Into<Arc<ConnectivityTable>>) -> Self {
        self.insert(name, table);
        self
    }

    /// Bind `name`, returning the previously bound table.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        table: impl Into<Arc<ConnectivityTable>>,
    ) -> Option<Arc<ConnectivityTable>> {
        self.tables.insert(name.into(), table.into())
    }

    /// The table bound to `name`.
    pub fn get(&self, name: &str) -> Option<&ConnectivityTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Bound names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of bound offsets.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up the table for `offset` and check it agrees with the
    /// declaration.
    pub fn resolve(&self, offset: &Offset) -> Result<&ConnectivityTable, EvalError> {
        let table = self
            .get(offset.name())
            .ok_or_else(|| EvalError::MissingOffsetProvider {
                offset: offset.name().to_string(),
            })?;
        let mismatch = |what: &str, expected: String, found: String| EvalError::DimensionMismatch {
            context: format!("offset '{}' {what}", offset.name()),
            expected,
            found,
        };
        if table.origin() != offset.target() {
            return Err(mismatch(
                "origin",
                offset.target().name().to_string(),
                table.origin().name().to_string(),
            ));
        }
        if table.neighbor() != offset.source() {
            return Err(mismatch(
                "neighbour",
                offset.source().name().to_string(),
                table.neighbor().name().to_string(),
            ));
        }
        if table.arity() != offset.arity() {
            return Err(mismatch(
                "arity",
                offset.arity().to_string(),
                table.arity().to_string(),
            ));
        }
        trace!(
            offset = offset.name(),
            rows = table.rows(),
            arity = table.arity(),
            "resolved offset"
        );
        Ok(table)
    }
}
