//! Dense, dimension-tagged field storage.

use icosa_core::{classify, format_dims, AxisRoles, Dimension, Dims, Element, ElementType};
use smallvec::SmallVec;

use crate::error::FieldError;

/// Element strides for each axis role.
///
/// A stride of `0` for an absent axis makes the field broadcast along that
/// axis: a `Field[Edge]` read at `(edge, level)` returns the same value for
/// every level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisStrides {
    /// Stride of the horizontal axis.
    pub horizontal: usize,
    /// Stride of the vertical axis.
    pub vertical: usize,
    /// Stride of the local axis.
    pub local: usize,
}

impl AxisStrides {
    /// Flat offset of `(h, k, j)`.
    #[inline]
    pub fn offset(&self, h: usize, k: usize, j: usize) -> usize {
        h * self.horizontal + k * self.vertical + j * self.local
    }
}

/// An N-dimensional dense row-major array tagged with its dimensions.
///
/// Fields are created by the caller and mutated in place by whichever
/// operator call writes them. Nothing copies a field implicitly.
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
/// use icosa_field::Field;
///
/// let edge = Dimension::horizontal("Edge", HorizontalKind::Edge);
/// let k = Dimension::vertical("K");
/// let vn = Field::<f64>::zeros([edge, k], &[12, 4]).unwrap();
/// assert_eq!(vn.horizontal_extent(), Some(12));
/// assert_eq!(vn.vertical_extent(), Some(4));
/// assert_eq!(vn.len(), 48);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T: Element> {
    dims: Dims,
    shape: SmallVec<[usize; 3]>,
    roles: AxisRoles,
    strides: AxisStrides,
    data: Vec<T>,
}

impl<T: Element> Field<T> {
    /// Wrap an existing buffer.
    ///
    /// `data` is row-major in the order of `dims`.
    pub fn new(
        dims: impl IntoIterator<Item = Dimension>,
        shape: &[usize],
        data: Vec<T>,
    ) -> Result<Self, FieldError> {
        let dims: Dims = dims.into_iter().collect();
        let roles = classify(&dims)?;
        if dims.len() != shape.len() {
            return Err(FieldError::RankMismatch {
                dims: dims.len(),
                shape: shape.len(),
            });
        }
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(FieldError::DataLength {
                expected,
                found: data.len(),
            });
        }
        if let Some(axis) = roles.local {
            let max_arity = dims[axis].max_arity().unwrap_or(0);
            if shape[axis] > max_arity {
                return Err(FieldError::LocalExtent {
                    name: dims[axis].name().to_string(),
                    max_arity,
                    extent: shape[axis],
                });
            }
        }
        let row_major = row_major_strides(shape);
        let stride_of = |axis: Option<usize>| axis.map_or(0, |a| row_major[a]);
        let strides = AxisStrides {
            horizontal: stride_of(roles.horizontal),
            vertical: stride_of(roles.vertical),
            local: stride_of(roles.local),
        };
        Ok(Self {
            dims,
            shape: SmallVec::from_slice(shape),
            roles,
            strides,
            data,
        })
    }

    /// A field with every element set to `value`.
    pub fn filled(
        dims: impl IntoIterator<Item = Dimension>,
        shape: &[usize],
        value: T,
    ) -> Result<Self, FieldError> {
        let len = shape.iter().product();
        Self::new(dims, shape, vec![value; len])
    }

    /// A zero-initialized field.
    pub fn zeros(
        dims: impl IntoIterator<Item = Dimension>,
        shape: &[usize],
    ) -> Result<Self, FieldError> {
        Self::filled(dims, shape, T::ZERO)
    }

    /// Ordered dimension tags.
    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    /// Extent of each axis, in the order of [`dims`](Self::dims).
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Axis positions of the horizontal, vertical and local dimensions.
    pub fn roles(&self) -> AxisRoles {
        self.roles
    }

    /// Per-role element strides (zero for absent axes).
    pub fn strides(&self) -> AxisStrides {
        self.strides
    }

    /// Element precision.
    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    /// The horizontal dimension, if any.
    pub fn horizontal_dim(&self) -> Option<&Dimension> {
        self.roles.horizontal.map(|a| &self.dims[a])
    }

    /// The local dimension, if any.
    pub fn local_dim(&self) -> Option<&Dimension> {
        self.roles.local.map(|a| &self.dims[a])
    }

    /// Number of horizontal entities.
    pub fn horizontal_extent(&self) -> Option<usize> {
        self.roles.horizontal.map(|a| self.shape[a])
    }

    /// Number of vertical levels.
    pub fn vertical_extent(&self) -> Option<usize> {
        self.roles.vertical.map(|a| self.shape[a])
    }

    /// Number of local slots.
    pub fn local_extent(&self) -> Option<usize> {
        self.roles.local.map(|a| self.shape[a])
    }

    /// Extent of the axis tagged `dim`.
    pub fn extent(&self, dim: &Dimension) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|a| self.shape[a])
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the field holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major index of a multi-index, or `None` if out of bounds.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(self.shape.iter()) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        Some(flat)
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        self.flat_index(index).map(|i| self.data[i])
    }

    /// Mutable element at a multi-index.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let i = self.flat_index(index)?;
        Some(&mut self.data[i])
    }

    /// The flat buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The flat buffer, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the field, returning its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// `[Edge, K]`-style rendering of the dimension list.
    pub fn dims_label(&self) -> String {
        format_dims(&self.dims)
    }
}

fn row_major_strides(shape: &[usize]) -> SmallVec<[usize; 3]> {
    let mut strides: SmallVec<[usize; 3]> = SmallVec::from_elem(1, shape.len());
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}
