//! Field construction errors.

use std::error::Error;
use std::fmt;

use icosa_core::DimensionError;

/// Errors that can occur while constructing or indexing a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The dimension list violates the one-per-kind invariant.
    Dimensions(DimensionError),
    /// The shape has a different rank than the dimension list.
    RankMismatch {
        /// Number of dimensions.
        dims: usize,
        /// Number of shape entries.
        shape: usize,
    },
    /// The data buffer length does not match the shape.
    DataLength {
        /// Product of the shape.
        expected: usize,
        /// Actual buffer length.
        found: usize,
    },
    /// A local axis extent exceeds the dimension's declared arity.
    LocalExtent {
        /// Local dimension name.
        name: String,
        /// Declared maximum arity.
        max_arity: usize,
        /// Extent in the shape.
        extent: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensions(e) => write!(f, "invalid dimensions: {e}"),
            Self::RankMismatch { dims, shape } => {
                write!(f, "{dims} dimensions but shape has rank {shape}")
            }
            Self::DataLength { expected, found } => {
                write!(f, "data length {found} does not match shape ({expected} elements)")
            }
            Self::LocalExtent {
                name,
                max_arity,
                extent,
            } => write!(
                f,
                "local dimension '{name}' has extent {extent}, above its arity {max_arity}"
            ),
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dimensions(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DimensionError> for FieldError {
    fn from(e: DimensionError) -> Self {
        Self::Dimensions(e)
    }
}
