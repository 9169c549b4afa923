//! Storage interface for matrices that own their elements.
//!
//! [`MatrixStorage`] is what [`SymmetricMatrix`](crate::SymmetricMatrix)
//! needs from the matrix it wraps. Elements are addressed by line and by a
//! position inside that line; for dense storage the position equals the
//! minor index, for sparse storage it counts stored elements only.
//! [`SparseStorage`] adds the operations that only make sense when absent
//! elements take no space.

use lamina_core::{Result, StorageOrder};

use crate::traits::MatrixExpr;

/// A matrix container usable as the backing store of an adaptor.
pub trait MatrixStorage: MatrixExpr + Clone {
    /// Absent elements are not stored.
    const IS_SPARSE: bool;

    /// The dimensions can change after construction.
    const IS_RESIZABLE: bool;

    /// Creates an empty (all-zero) matrix.
    fn with_dimensions(rows: usize, columns: usize) -> Self;

    /// Copies the non-default elements of `rhs` into a new matrix.
    fn from_expr<E>(rhs: &E) -> Self
    where
        E: MatrixExpr<Element = Self::Element> + ?Sized,
    {
        let mut m = Self::with_dimensions(rhs.rows(), rhs.columns());
        rhs.for_each_non_zero(|row, column, value| {
            m.set(row, column, value);
        });
        m
    }

    /// Number of lines.
    fn lines(&self) -> usize;

    /// Number of positions in `line`.
    fn line_len(&self, line: usize) -> usize;

    /// Minor index of the element at `pos` in `line`.
    fn index_at(&self, line: usize, pos: usize) -> usize;

    /// Value of the element at `pos` in `line`.
    fn value_at(&self, line: usize, pos: usize) -> Self::Element;

    /// Position of `(row, column)` within its line, if stored.
    fn find(&self, row: usize, column: usize) -> Option<usize>;

    /// First position in the line of `(row, column)` whose minor index is not
    /// below that of the element.
    fn lower_bound(&self, row: usize, column: usize) -> usize;

    /// First position in the line of `(row, column)` whose minor index is
    /// above that of the element.
    fn upper_bound(&self, row: usize, column: usize) -> usize;

    /// Element at `(row, column)`, zero if absent.
    fn get(&self, row: usize, column: usize) -> Self::Element;

    /// Stores `value` at `(row, column)` and returns its position.
    fn set(&mut self, row: usize, column: usize, value: Self::Element) -> usize;

    /// Removes the element at `(row, column)`. Dense storage sets it to zero.
    fn erase_element(&mut self, row: usize, column: usize);

    /// Mutable access to two stored elements given as `(line, pos)`.
    ///
    /// The second reference is `None` if both name the same element.
    fn value_pair_mut(
        &mut self,
        first: (usize, usize),
        second: (usize, usize),
    ) -> (&mut Self::Element, Option<&mut Self::Element>);

    /// Sets every element to zero, keeping the dimensions.
    fn reset(&mut self);

    /// Sets every element of `line` to zero.
    fn reset_line(&mut self, line: usize);

    /// Shrinks the matrix to 0×0.
    fn clear(&mut self);

    /// Changes the dimensions. With `preserve`, the overlapping elements are
    /// kept.
    fn resize(&mut self, rows: usize, columns: usize, preserve: bool);

    /// Multiplies every element by `scalar`.
    fn scale(&mut self, scalar: Self::Element);

    /// Divides every element by `scalar`.
    fn div_scalar(&mut self, scalar: Self::Element);

    /// Multiplies the diagonal by `scalar`.
    fn scale_diagonal(&mut self, scalar: Self::Element);

    /// Number of non-default elements.
    fn non_zeros(&self) -> usize;

    /// Number of non-default elements in `line`.
    fn non_zeros_line(&self, line: usize) -> usize;

    /// Number of element slots.
    fn capacity(&self) -> usize;

    /// Number of element slots of `line`.
    fn capacity_line(&self, line: usize) -> usize;

    /// Returns true if the matrix is square, every stored element has a
    /// stored mirror, and mirrored values agree.
    fn is_symmetric(&self) -> bool {
        if self.rows() != self.columns() {
            return false;
        }
        for line in 0..self.lines() {
            for pos in 0..self.line_len(line) {
                let (row, column) =
                    <Self::Order as StorageOrder>::from_line(line, self.index_at(line, pos));
                if row == column {
                    continue;
                }
                match self.find(column, row) {
                    Some(_) if self.get(column, row) == self.value_at(line, pos) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// `self += rhs`, element by element.
    fn add_expr<E>(&mut self, rhs: &E)
    where
        E: MatrixExpr<Element = Self::Element> + ?Sized,
    {
        rhs.for_each_non_zero(|row, column, value| {
            let current = self.get(row, column);
            self.set(row, column, current + value);
        });
    }

    /// `self -= rhs`, element by element.
    fn sub_expr<E>(&mut self, rhs: &E)
    where
        E: MatrixExpr<Element = Self::Element> + ?Sized,
    {
        rhs.for_each_non_zero(|row, column, value| {
            let current = self.get(row, column);
            self.set(row, column, current - value);
        });
    }
}

/// Storage where absent elements take no space.
pub trait SparseStorage: MatrixStorage {
    /// Creates an empty matrix with room for `nonzeros` elements.
    fn with_capacity(rows: usize, columns: usize, nonzeros: usize) -> Self;

    /// Inserts a new element and returns its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateElement`](lamina_core::Error) if the element
    /// is already stored; the matrix is unchanged.
    fn insert(&mut self, row: usize, column: usize, value: Self::Element) -> Result<usize>;

    /// Removes the element at `(row, column)`, if stored.
    fn erase(&mut self, row: usize, column: usize);

    /// Removes the element at `pos` of `line` and returns the position of its
    /// successor. An end position is a no-op.
    fn erase_at(&mut self, line: usize, pos: usize) -> usize;

    /// Removes positions `first..last` of `line` and returns `first`.
    fn erase_range(&mut self, line: usize, first: usize, last: usize) -> usize;

    /// Appends an element behind the last stored one of its line.
    ///
    /// With `check` set, default values are skipped.
    fn append(&mut self, row: usize, column: usize, value: Self::Element, check: bool);

    /// Ends the appends to `line`.
    fn finalize(&mut self, line: usize);

    /// Grows the total capacity to at least `nonzeros`.
    fn reserve(&mut self, nonzeros: usize);

    /// Grows the capacity of `line` to at least `nonzeros`.
    fn reserve_line(&mut self, line: usize, nonzeros: usize);

    /// Releases all unused capacity.
    fn trim(&mut self);

    /// Releases the unused capacity of `line`.
    fn trim_line(&mut self, line: usize);
}

/// Borrows `data[a]` and, if `b != a`, `data[b]` mutably.
pub(crate) fn pair_mut<T>(data: &mut [T], a: usize, b: usize) -> (&mut T, Option<&mut T>) {
    use std::cmp::Ordering;

    match a.cmp(&b) {
        Ordering::Equal => (&mut data[a], None),
        Ordering::Less => {
            let (lo, hi) = data.split_at_mut(b);
            (&mut lo[a], Some(&mut hi[0]))
        }
        Ordering::Greater => {
            let (lo, hi) = data.split_at_mut(a);
            (&mut hi[0], Some(&mut lo[b]))
        }
    }
}
