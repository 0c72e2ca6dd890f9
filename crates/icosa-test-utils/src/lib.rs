//! Test utilities for icosa development.
//!
//! Provides the [`SimpleMesh`] test topology, deterministic field factories
//! and mock [`FieldOperator`](icosa_operator::FieldOperator)
//! implementations in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mesh;

use icosa_core::{Dimension, Element};
use icosa_field::{Field, FieldError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use mesh::SimpleMesh;

/// A field of uniform values in `[-1, 1)`, reproducible from `seed`.
pub fn random_field<T: Element>(
    dims: impl IntoIterator<Item = Dimension>,
    shape: &[usize],
    seed: u64,
) -> Result<Field<T>, FieldError> {
    random_field_in(dims, shape, seed, -1.0, 1.0)
}

/// A field of uniform values in `[low, high)`, reproducible from `seed`.
pub fn random_field_in<T: Element>(
    dims: impl IntoIterator<Item = Dimension>,
    shape: &[usize],
    seed: u64,
    low: f64,
    high: f64,
) -> Result<Field<T>, FieldError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let len = shape.iter().product();
    let data = (0..len)
        .map(|_| T::from_f64(rng.random_range(low..high)))
        .collect();
    Field::new(dims, shape, data)
}

/// A field with every element set to `value`.
pub fn constant_field<T: Element>(
    dims: impl IntoIterator<Item = Dimension>,
    shape: &[usize],
    value: f64,
) -> Result<Field<T>, FieldError> {
    Field::filled(dims, shape, T::from_f64(value))
}

/// A zero-initialized field.
pub fn zero_field<T: Element>(
    dims: impl IntoIterator<Item = Dimension>,
    shape: &[usize],
) -> Result<Field<T>, FieldError> {
    Field::zeros(dims, shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{cell, k};

    #[test]
    fn random_field_is_seeded() {
        let a = random_field::<f64>([cell(), k()], &[4, 3], 7).unwrap();
        let b = random_field::<f64>([cell(), k()], &[4, 3], 7).unwrap();
        let c = random_field::<f64>([cell(), k()], &[4, 3], 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_slice().iter().all(|&x| (-1.0..1.0).contains(&x)));
    }

    #[test]
    fn constant_and_zero() {
        let c = constant_field::<f32>([cell()], &[3], 2.5).unwrap();
        assert_eq!(c.as_slice(), &[2.5, 2.5, 2.5]);
        let z = zero_field::<f64>([cell()], &[2]).unwrap();
        assert_eq!(z.as_slice(), &[0.0, 0.0]);
    }
}
