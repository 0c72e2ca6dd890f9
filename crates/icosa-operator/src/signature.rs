//! Parameter lists and operator signatures.

use icosa_core::{classify, format_dims, AxisRoles, Dimension, Dims, EvalError};
use indexmap::{IndexMap, IndexSet};

/// Named field parameters (with their declared dimensions) and named scalar
/// parameters, sharing one namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    fields: IndexMap<String, Dims>,
    scalars: IndexSet<String>,
}

impl Parameters {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field parameter.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
    ) -> Result<(), EvalError> {
        let name = name.into();
        self.check_unique(&name)?;
        let dims: Dims = dims.into_iter().collect();
        if classify(&dims).is_err() {
            return Err(EvalError::DimensionMismatch {
                context: format!("parameter '{name}'"),
                expected: "at most one dimension of each kind".to_string(),
                found: format_dims(&dims),
            });
        }
        self.fields.insert(name, dims);
        Ok(())
    }

    /// Declare a scalar parameter.
    pub fn add_scalar(&mut self, name: impl Into<String>) -> Result<(), EvalError> {
        let name = name.into();
        self.check_unique(&name)?;
        self.scalars.insert(name);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<(), EvalError> {
        if self.fields.contains_key(name) || self.scalars.contains(name) {
            return Err(EvalError::DimensionMismatch {
                context: format!("parameter '{name}'"),
                expected: "a unique name".to_string(),
                found: "a second declaration".to_string(),
            });
        }
        Ok(())
    }

    /// Declared dimensions of a field parameter.
    pub fn field(&self, name: &str) -> Option<&[Dimension]> {
        self.fields.get(name).map(|d| d.as_slice())
    }

    /// Whether `name` is a scalar parameter.
    pub fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains(name)
    }

    /// Field parameters in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Dimension])> {
        self.fields.iter().map(|(n, d)| (n.as_str(), d.as_slice()))
    }

    /// Scalar parameters in declaration order.
    pub fn scalars(&self) -> impl Iterator<Item = &str> {
        self.scalars.iter().map(String::as_str)
    }

    /// Total number of parameters.
    pub fn len(&self) -> usize {
        self.fields.len() + self.scalars.len()
    }

    /// Returns `true` if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether two dimension lists hold the same dimensions, in any order.
///
/// Storage order is a layout detail; `[Edge, K]` and `[K, Edge]` describe
/// the same field.
pub fn same_dims(a: &[Dimension], b: &[Dimension]) -> bool {
    a.len() == b.len() && a.iter().all(|d| b.contains(d))
}

/// An operator's parameters plus its declared output dimensions.
///
/// The output has exactly one horizontal dimension, at most one vertical
/// dimension and no local dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    params: Parameters,
    output: Dims,
    output_roles: AxisRoles,
}

impl Signature {
    /// Start building a signature.
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// The parameters.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Declared output dimensions.
    pub fn output(&self) -> &[Dimension] {
        &self.output
    }

    /// Horizontal dimension of the output.
    pub fn output_horizontal(&self) -> &Dimension {
        // `build` guarantees a horizontal axis.
        &self.output[self.output_roles.horizontal.unwrap_or(0)]
    }

    /// Vertical dimension of the output, if any.
    pub fn output_vertical(&self) -> Option<&Dimension> {
        self.output_roles.vertical.map(|a| &self.output[a])
    }
}

/// Builder for [`Signature`].
#[derive(Clone, Debug, Default)]
pub struct SignatureBuilder {
    fields: Vec<(String, Vec<Dimension>)>,
    scalars: Vec<String>,
    output: Option<Vec<Dimension>>,
}

impl SignatureBuilder {
    /// Declare a field parameter.
    pub fn field(
        mut self,
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dimension>,
    ) -> Self {
        self.fields.push((name.into(), dims.into_iter().collect()));
        self
    }

    /// Declare a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.scalars.push(name.into());
        self
    }

    /// Set the output dimensions (required).
    pub fn output(mut self, dims: impl IntoIterator<Item = Dimension>) -> Self {
        self.output = Some(dims.into_iter().collect());
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<Signature, EvalError> {
        let mut params = Parameters::new();
        for (name, dims) in self.fields {
            params.add_field(name, dims)?;
        }
        for name in self.scalars {
            params.add_scalar(name)?;
        }
        let output: Dims = self.output.unwrap_or_default().into_iter().collect();
        let bad_output = || EvalError::DimensionMismatch {
            context: "operator output".to_string(),
            expected: "one horizontal and at most one vertical dimension".to_string(),
            found: format_dims(&output),
        };
        let roles = classify(&output).map_err(|_| bad_output())?;
        if roles.horizontal.is_none() || roles.local.is_some() {
            return Err(bad_output());
        }
        Ok(Signature {
            params,
            output,
            output_roles: roles,
        })
    }
}
