//! Mirror-updating element handles.

use lamina_core::{Numeric, StorageOrder};

use crate::storage::MatrixStorage;

/// Setter proxy for `A(i,j)` of a symmetric matrix.
///
/// Every write goes to `(i,j)` and `(j,i)`. Writing the default value erases
/// both elements.
#[derive(Debug)]
pub struct SymmetricEntry<'a, MT> {
    matrix: &'a mut MT,
    row: usize,
    column: usize,
}

impl<'a, MT: MatrixStorage> SymmetricEntry<'a, MT> {
    pub(crate) fn new(matrix: &'a mut MT, row: usize, column: usize) -> Self {
        Self {
            matrix,
            row,
            column,
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> MT::Element {
        self.matrix.get(self.row, self.column)
    }

    /// Returns true if the element is stored.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.matrix.find(self.row, self.column).is_some()
    }

    /// Writes `value` to both mirrors.
    pub fn set(&mut self, value: MT::Element) {
        let (i, j) = (self.row, self.column);
        if value.is_default() {
            self.matrix.erase_element(i, j);
            if i != j {
                self.matrix.erase_element(j, i);
            }
        } else {
            self.matrix.set(i, j, value);
            if i != j {
                self.matrix.set(j, i, value);
            }
        }
    }

    /// `A(i,j) += value`.
    pub fn add(&mut self, value: MT::Element) {
        self.set(self.get() + value);
    }

    /// `A(i,j) -= value`.
    pub fn sub(&mut self, value: MT::Element) {
        self.set(self.get() - value);
    }

    /// `A(i,j) *= value`.
    pub fn mul(&mut self, value: MT::Element) {
        self.set(self.get() * value);
    }

    /// `A(i,j) /= value`.
    pub fn div(&mut self, value: MT::Element) {
        self.set(self.get() / value);
    }
}

/// A stored element and its mirror, written together.
///
/// On the diagonal both are the same element and `second` is absent.
#[derive(Debug)]
pub struct SymmetricValue<'a, T> {
    first: &'a mut T,
    second: Option<&'a mut T>,
}

impl<'a, T: Numeric> SymmetricValue<'a, T> {
    pub(crate) fn new(first: &'a mut T, second: Option<&'a mut T>) -> Self {
        Self { first, second }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        *self.first
    }

    /// Returns true if both halves hold the default value.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.first.is_default()
    }

    /// Writes `value` to both halves.
    pub fn set(&mut self, value: T) {
        *self.first = value;
        if let Some(second) = self.second.as_deref_mut() {
            *second = value;
        }
    }

    /// Adds `value` to both halves.
    pub fn add(&mut self, value: T) {
        self.set(self.get() + value);
    }

    /// Subtracts `value` from both halves.
    pub fn sub(&mut self, value: T) {
        self.set(self.get() - value);
    }

    /// Multiplies both halves by `value`.
    pub fn mul(&mut self, value: T) {
        self.set(self.get() * value);
    }

    /// Divides both halves by `value`.
    pub fn div(&mut self, value: T) {
        self.set(self.get() / value);
    }
}

/// An index of a line together with the mirrored value stored there.
#[derive(Debug)]
pub struct SymmetricElement<'a, T> {
    index: usize,
    value: SymmetricValue<'a, T>,
}

impl<'a, T: Numeric> SymmetricElement<'a, T> {
    pub(crate) fn new(index: usize, value: SymmetricValue<'a, T>) -> Self {
        Self { index, value }
    }

    /// Minor index of the element.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The mirrored value.
    #[must_use]
    pub fn value(&self) -> &SymmetricValue<'a, T> {
        &self.value
    }

    /// The mirrored value, writable.
    pub fn value_mut(&mut self) -> &mut SymmetricValue<'a, T> {
        &mut self.value
    }
}

/// Coordinates of the mirror of `(line, minor)` as `(row, column)`.
pub(crate) fn mirror_of<SO: StorageOrder>(line: usize, minor: usize) -> (usize, usize) {
    SO::from_line(minor, line)
}
