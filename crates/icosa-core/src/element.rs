//! Numeric element types for field storage.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Runtime tag for a field's element precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Single precision (`f32`).
    F32,
    /// Double precision (`f64`).
    F64,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "float32"),
            Self::F64 => write!(f, "float64"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A field element: `f32` or `f64`.
///
/// Sealed; all arithmetic in an operator call is carried out in the
/// element type of the fields involved.
pub trait Element:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + Sum
{
    /// Precision tag.
    const ELEMENT_TYPE: ElementType;
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Convert from `f64`, rounding if narrower.
    fn from_f64(v: f64) -> Self;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Bit-level equality (distinguishes `-0.0` and NaN payloads).
    fn bit_eq(self, other: Self) -> bool;
}

impl Element for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn bit_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Element for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::F64;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn bit_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}
