//! Named indexing axes and the [`DimensionRegistry`].
//!
//! A [`Dimension`] is one of three closed kinds: a horizontal mesh entity
//! (cell, edge, vertex), the vertical level axis, or a local neighbour axis
//! with a fixed maximum arity. Field dimension lists are checked against the
//! one-per-kind invariant by [`classify`].

use crate::error::DimensionError;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;

/// Horizontal mesh entity kinds.
///
/// Fixed per mesh topology, so modelled as a closed enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HorizontalKind {
    /// Primal cells (triangles on an icosahedral grid).
    Cell,
    /// Edges between cells.
    Edge,
    /// Vertices (dual cells).
    Vertex,
}

impl fmt::Display for HorizontalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::Edge => write!(f, "edge"),
            Self::Vertex => write!(f, "vertex"),
        }
    }
}

/// Classification of a [`Dimension`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// A horizontal mesh entity axis.
    Horizontal(HorizontalKind),
    /// The vertical level axis.
    Vertical,
    /// A compact neighbour axis used by sparse fields and reductions.
    Local {
        /// Maximum number of neighbour slots.
        max_arity: usize,
    },
}

/// A named indexing axis.
///
/// Dimensions are plain immutable values. Two dimensions are the same axis
/// iff both name and kind are equal.
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
///
/// let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
/// let e2c = Dimension::local("E2C", 2);
/// assert!(edge.is_horizontal());
/// assert_eq!(e2c.max_arity(), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dimension {
    name: Cow<'static, str>,
    kind: DimensionKind,
}

impl Dimension {
    /// Create a dimension of the given kind.
    pub fn new(name: impl Into<Cow<'static, str>>, kind: DimensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a horizontal entity dimension.
    pub fn horizontal(name: impl Into<Cow<'static, str>>, kind: HorizontalKind) -> Self {
        Self::new(name, DimensionKind::Horizontal(kind))
    }

    /// Create the vertical level dimension.
    pub fn vertical(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, DimensionKind::Vertical)
    }

    /// Create a local neighbour dimension with `max_arity` slots.
    pub fn local(name: impl Into<Cow<'static, str>>, max_arity: usize) -> Self {
        Self::new(name, DimensionKind::Local { max_arity })
    }

    /// The dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dimension kind.
    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    /// Returns `true` for horizontal entity dimensions.
    pub fn is_horizontal(&self) -> bool {
        matches!(self.kind, DimensionKind::Horizontal(_))
    }

    /// Returns `true` for the vertical dimension.
    pub fn is_vertical(&self) -> bool {
        self.kind == DimensionKind::Vertical
    }

    /// Returns `true` for local neighbour dimensions.
    pub fn is_local(&self) -> bool {
        matches!(self.kind, DimensionKind::Local { .. })
    }

    /// The horizontal entity kind, if this is a horizontal dimension.
    pub fn horizontal_kind(&self) -> Option<HorizontalKind> {
        match self.kind {
            DimensionKind::Horizontal(k) => Some(k),
            _ => None,
        }
    }

    /// The maximum arity, if this is a local dimension.
    pub fn max_arity(&self) -> Option<usize> {
        match self.kind {
            DimensionKind::Local { max_arity } => Some(max_arity),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ordered dimension list. Fields rarely carry more than three axes.
pub type Dims = SmallVec<[Dimension; 3]>;

/// Render a dimension list as `[Edge, K]` for diagnostics.
pub fn format_dims(dims: &[Dimension]) -> String {
    let names: Vec<&str> = dims.iter().map(Dimension::name).collect();
    format!("[{}]", names.join(", "))
}

/// Axis positions of each dimension kind within a dimension list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisRoles {
    /// Position of the horizontal dimension.
    pub horizontal: Option<usize>,
    /// Position of the vertical dimension.
    pub vertical: Option<usize>,
    /// Position of the local dimension.
    pub local: Option<usize>,
}

/// Check the one-per-kind invariant and locate each axis.
///
/// Rejects duplicate names, more than one dimension of any kind, and local
/// dimensions with zero arity.
pub fn classify(dims: &[Dimension]) -> Result<AxisRoles, DimensionError> {
    let mut roles = AxisRoles::default();
    for (axis, dim) in dims.iter().enumerate() {
        if dims[..axis].iter().any(|d| d.name() == dim.name()) {
            return Err(DimensionError::Duplicate {
                name: dim.name().to_string(),
            });
        }
        let slot = match dim.kind() {
            DimensionKind::Horizontal(_) => &mut roles.horizontal,
            DimensionKind::Vertical => &mut roles.vertical,
            DimensionKind::Local { max_arity } => {
                if max_arity == 0 {
                    return Err(DimensionError::ZeroArity {
                        name: dim.name().to_string(),
                    });
                }
                &mut roles.local
            }
        };
        if slot.is_some() {
            return Err(DimensionError::TooManyOfKind {
                dims: format_dims(dims),
                kind: kind_label(dim.kind()),
            });
        }
        *slot = Some(axis);
    }
    Ok(roles)
}

fn kind_label(kind: DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Horizontal(_) => "horizontal",
        DimensionKind::Vertical => "vertical",
        DimensionKind::Local { .. } => "local",
    }
}

/// Immutable, insertion-ordered set of declared dimensions.
///
/// Built once per mesh topology and passed explicitly to configuration
/// validation; there is no process-wide registry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DimensionRegistry {
    dims: IndexMap<String, Dimension>,
}

impl DimensionRegistry {
    /// Build a registry from a list of dimensions.
    ///
    /// Fails on duplicate names or zero-arity local dimensions.
    pub fn from_dimensions(
        dims: impl IntoIterator<Item = Dimension>,
    ) -> Result<Self, DimensionError> {
        let mut map = IndexMap::new();
        for dim in dims {
            if dim.max_arity() == Some(0) {
                return Err(DimensionError::ZeroArity {
                    name: dim.name().to_string(),
                });
            }
            let name = dim.name().to_string();
            if map.insert(name.clone(), dim).is_some() {
                return Err(DimensionError::Duplicate { name });
            }
        }
        Ok(Self { dims: map })
    }

    /// Look up a dimension by name.
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dims.get(name)
    }

    /// Returns `true` if an identical dimension (name and kind) is registered.
    pub fn contains(&self, dim: &Dimension) -> bool {
        self.dims.get(dim.name()) == Some(dim)
    }

    /// Iterate over dimensions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
        self.dims.values()
    }

    /// Iterate over the horizontal dimensions.
    pub fn horizontal(&self) -> impl Iterator<Item = &Dimension> {
        self.iter().filter(|d| d.is_horizontal())
    }

    /// Number of declared dimensions.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// Returns `true` if no dimensions are declared.
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }
}
