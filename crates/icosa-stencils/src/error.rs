//! Errors from assembling stencils and their meshes.

use std::error::Error;
use std::fmt;

use icosa_core::{DimensionError, EvalError};
use icosa_engine::ConfigError;
use icosa_field::FieldError;
use icosa_mesh::{DomainError, MeshError};
use icosa_operator::PlanError;

/// Any failure while building a stencil, its program or its mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StencilError {
    /// A dimension list or registry was rejected.
    Dimension(DimensionError),
    /// A connectivity table or offset was rejected.
    Mesh(MeshError),
    /// Marker lookup failed.
    Domain(DomainError),
    /// An operator body did not check against its signature.
    Operator(EvalError),
    /// The statement list did not validate.
    Program(PlanError),
    /// The mesh configuration did not validate.
    Config(ConfigError),
    /// A field could not be allocated.
    Field(FieldError),
}

impl fmt::Display for StencilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension(e) => write!(f, "dimension: {e}"),
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Operator(e) => write!(f, "operator: {e}"),
            Self::Program(e) => write!(f, "program: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
        }
    }
}

impl Error for StencilError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dimension(e) => Some(e),
            Self::Mesh(e) => Some(e),
            Self::Domain(e) => Some(e),
            Self::Operator(e) => Some(e),
            Self::Program(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Field(e) => Some(e),
        }
    }
}

macro_rules! from_layer {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for StencilError {
                fn from(e: $ty) -> Self {
                    Self::$variant(e)
                }
            }
        )*
    };
}

from_layer!(
    Dimension(DimensionError),
    Mesh(MeshError),
    Domain(DomainError),
    Operator(EvalError),
    Program(PlanError),
    Config(ConfigError),
    Field(FieldError),
);
