//! Named field and scalar storage shared by the statements of a program.

use icosa_core::Element;
use indexmap::IndexMap;

use crate::field::Field;

/// Caller-owned storage for one invocation: named fields plus named scalars.
///
/// Statements read and write fields through their names, so a field written
/// by one statement is the same buffer the next statement reads. This
/// aliasing is how later statements observe earlier results.
///
/// ```
/// use icosa_core::{Dimension, HorizontalKind};
/// use icosa_field::{Bindings, Field};
///
/// let cell = Dimension::horizontal("Cell", HorizontalKind::Cell);
/// let bindings = Bindings::new()
///     .with_field("a", Field::<f32>::filled([cell], &[5], 2.0).unwrap())
///     .with_scalar("scale", 0.5);
/// assert_eq!(bindings.field("a").unwrap().len(), 5);
/// assert_eq!(bindings.scalar("scale"), Some(0.5));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Bindings<T: Element> {
    fields: IndexMap<String, Field<T>>,
    scalars: IndexMap<String, T>,
}

impl<T: Element> Bindings<T> {
    /// Empty bindings.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            scalars: IndexMap::new(),
        }
    }

    /// Builder-style [`insert_field`](Self::insert_field).
    pub fn with_field(mut self, name: impl Into<String>, field: Field<T>) -> Self {
        self.insert_field(name, field);
        self
    }

    /// Builder-style [`insert_scalar`](Self::insert_scalar).
    pub fn with_scalar(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert_scalar(name, value);
        self
    }

    /// Bind a field, returning any field previously bound to `name`.
    pub fn insert_field(&mut self, name: impl Into<String>, field: Field<T>) -> Option<Field<T>> {
        self.fields.insert(name.into(), field)
    }

    /// Bind a scalar, returning any value previously bound to `name`.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        self.scalars.insert(name.into(), value)
    }

    /// The field bound to `name`.
    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.fields.get(name)
    }

    /// The field bound to `name`, mutably.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field<T>> {
        self.fields.get_mut(name)
    }

    /// The scalar bound to `name`.
    pub fn scalar(&self, name: &str) -> Option<T> {
        self.scalars.get(name).copied()
    }

    /// Remove and return the field bound to `name`.
    pub fn remove_field(&mut self, name: &str) -> Option<Field<T>> {
        self.fields.shift_remove(name)
    }

    /// Names of bound fields, in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Names of bound scalars, in insertion order.
    pub fn scalar_names(&self) -> impl Iterator<Item = &str> {
        self.scalars.keys().map(String::as_str)
    }
}

impl<T: Element> Default for Bindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icosa_core::{Dimension, HorizontalKind};

    fn cells(n: usize, v: f64) -> Field<f64> {
        Field::filled(
            [Dimension::horizontal("Cell", HorizontalKind::Cell)],
            &[n],
            v,
        )
        .unwrap()
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut b = Bindings::new();
        assert!(b.insert_field("x", cells(2, 1.0)).is_none());
        let old = b.insert_field("x", cells(2, 3.0)).unwrap();
        assert_eq!(old.as_slice(), &[1.0, 1.0]);
        assert_eq!(b.field("x").unwrap().as_slice(), &[3.0, 3.0]);
    }

    #[test]
    fn field_mut_writes_in_place() {
        let mut b = Bindings::new().with_field("x", cells(3, 0.0));
        b.field_mut("x").unwrap().as_mut_slice()[1] = 4.0;
        assert_eq!(b.field("x").unwrap().as_slice(), &[0.0, 4.0, 0.0]);
    }

    #[test]
    fn names_preserve_insertion_order() {
        let b = Bindings::new()
            .with_field("z", cells(1, 0.0))
            .with_field("a", cells(1, 0.0))
            .with_scalar("s", 1.0);
        let names: Vec<&str> = b.field_names().collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(b.scalar_names().collect::<Vec<_>>(), vec!["s"]);
    }

    #[test]
    fn remove_field() {
        let mut b = Bindings::new().with_field("x", cells(1, 2.0));
        assert!(b.remove_field("x").is_some());
        assert!(b.field("x").is_none());
        assert!(b.scalar("x").is_none());
    }
}
