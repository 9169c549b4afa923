//! Dense matrix in either storage order.
//!
//! Row-major matrices store each row contiguously, column-major matrices
//! each column. Both expose their lines as slices, which the multiplication
//! kernels feed to the SIMD routines.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use lamina_core::simd::REGISTER_BYTES;
use lamina_core::{Numeric, RowMajor, StorageOrder};

use crate::dispatch::EvalMode;
use crate::storage::MatrixStorage;
use crate::traits::{address_of, DenseMatrixExpr, MatrixExpr, Operand};

/// Dense matrix stored in order `SO`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicMatrix<T, SO = RowMajor> {
    /// Matrix entries in storage order.
    data: Vec<T>,
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    columns: usize,
    _order: PhantomData<SO>,
}

impl<T: Numeric, SO: StorageOrder> DynamicMatrix<T, SO> {
    /// Creates a new matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * columns],
            rows,
            columns,
            _order: PhantomData,
        }
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in length.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == num_cols),
            "rows differ in length"
        );
        Self::from_fn(num_rows, num_cols, |i, j| rows[i][j])
    }

    /// Creates a matrix with `f(row, column)` at every position.
    #[must_use]
    pub fn from_fn<F>(rows: usize, columns: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut m = Self::zeros(rows, columns);
        for i in 0..rows {
            for j in 0..columns {
                m[(i, j)] = f(i, j);
            }
        }
        m
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Evaluates `rhs` into a new matrix.
    #[must_use]
    pub fn from_expr<E>(rhs: &E) -> Self
    where
        E: MatrixExpr<Element = T> + ?Sized,
    {
        let mut m = Self::zeros(rhs.rows(), rhs.columns());
        rhs.for_each_non_zero(|i, j, value| m[(i, j)] = value);
        m
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Checks if the matrix is square.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// Number of lines: rows for row-major, columns for column-major.
    #[must_use]
    pub fn lines(&self) -> usize {
        if SO::IS_ROW_MAJOR {
            self.rows
        } else {
            self.columns
        }
    }

    /// Length of one line.
    #[must_use]
    pub fn line_len(&self) -> usize {
        if SO::IS_ROW_MAJOR {
            self.columns
        } else {
            self.rows
        }
    }

    /// Returns a slice of line `index`.
    #[must_use]
    pub fn line(&self, index: usize) -> &[T] {
        let len = self.line_len();
        &self.data[index * len..(index + 1) * len]
    }

    /// Returns a mutable slice of line `index`.
    pub fn line_mut(&mut self, index: usize) -> &mut [T] {
        let len = self.line_len();
        &mut self.data[index * len..(index + 1) * len]
    }

    /// Returns the entries in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the entries in storage order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Reinterprets the storage in the opposite order, which transposes the
    /// matrix without moving any element.
    #[must_use]
    pub fn into_opposite(self) -> DynamicMatrix<T, SO::Opposite> {
        DynamicMatrix {
            data: self.data,
            rows: self.columns,
            columns: self.rows,
            _order: PhantomData,
        }
    }

    /// Returns the transpose of the matrix in the same storage order.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.columns, self.rows, |i, j| self[(j, i)])
    }

    /// Returns true if the matrix is square and equal to its transpose.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.is_square() && (0..self.rows).all(|i| (0..i).all(|j| self[(i, j)] == self[(j, i)]))
    }

    fn offset(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.rows, "invalid row access index");
        debug_assert!(column < self.columns, "invalid column access index");
        let (line, minor) = SO::to_line(row, column);
        line * self.line_len() + minor
    }
}

impl<T: Numeric, SO: StorageOrder> Index<(usize, usize)> for DynamicMatrix<T, SO> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[self.offset(row, col)]
    }
}

impl<T: Numeric, SO: StorageOrder> IndexMut<(usize, usize)> for DynamicMatrix<T, SO> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}

impl<T: Numeric, SO: StorageOrder> Operand for DynamicMatrix<T, SO> {
    const SMP_ASSIGNABLE: bool = true;
    const VECTORIZABLE: bool = T::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        address_of(self) == alias
    }

    fn is_aligned(&self) -> bool {
        (self.data.as_ptr() as usize) % REGISTER_BYTES == 0
    }
}

impl<T: Numeric, SO: StorageOrder> MatrixExpr for DynamicMatrix<T, SO> {
    type Element = T;
    type Order = SO;

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn at(&self, row: usize, column: usize) -> T {
        self[(row, column)]
    }

    fn for_each_non_zero<F>(&self, mut f: F)
    where
        F: FnMut(usize, usize, T),
    {
        for line in 0..self.lines() {
            for (minor, &value) in self.line(line).iter().enumerate() {
                if !value.is_default() {
                    let (row, column) = SO::from_line(line, minor);
                    f(row, column, value);
                }
            }
        }
    }
}

impl<T: Numeric, SO: StorageOrder> DenseMatrixExpr for DynamicMatrix<T, SO> {
    fn line(&self, index: usize) -> Option<&[T]> {
        Some(DynamicMatrix::line(self, index))
    }

    fn evaluate(&self, _mode: EvalMode) -> Cow<'_, Self> {
        Cow::Borrowed(self)
    }
}

impl<T: Numeric, SO: StorageOrder> MatrixStorage for DynamicMatrix<T, SO> {
    const IS_SPARSE: bool = false;
    const IS_RESIZABLE: bool = true;

    fn with_dimensions(rows: usize, columns: usize) -> Self {
        Self::zeros(rows, columns)
    }

    fn lines(&self) -> usize {
        DynamicMatrix::lines(self)
    }

    fn line_len(&self, _line: usize) -> usize {
        DynamicMatrix::line_len(self)
    }

    fn index_at(&self, _line: usize, pos: usize) -> usize {
        pos
    }

    fn value_at(&self, line: usize, pos: usize) -> T {
        DynamicMatrix::line(self, line)[pos]
    }

    fn find(&self, row: usize, column: usize) -> Option<usize> {
        Some(SO::to_line(row, column).1)
    }

    fn lower_bound(&self, row: usize, column: usize) -> usize {
        SO::to_line(row, column).1
    }

    fn upper_bound(&self, row: usize, column: usize) -> usize {
        SO::to_line(row, column).1 + 1
    }

    fn get(&self, row: usize, column: usize) -> T {
        self[(row, column)]
    }

    fn set(&mut self, row: usize, column: usize, value: T) -> usize {
        self[(row, column)] = value;
        SO::to_line(row, column).1
    }

    fn erase_element(&mut self, row: usize, column: usize) {
        self[(row, column)] = T::zero();
    }

    fn value_pair_mut(
        &mut self,
        first: (usize, usize),
        second: (usize, usize),
    ) -> (&mut T, Option<&mut T>) {
        let len = DynamicMatrix::line_len(self);
        let a = first.0 * len + first.1;
        let b = second.0 * len + second.1;
        crate::storage::pair_mut(&mut self.data, a, b)
    }

    fn reset(&mut self) {
        self.data.fill(T::zero());
    }

    fn reset_line(&mut self, line: usize) {
        self.line_mut(line).fill(T::zero());
    }

    fn clear(&mut self) {
        self.data.clear();
        self.rows = 0;
        self.columns = 0;
    }

    fn resize(&mut self, rows: usize, columns: usize, preserve: bool) {
        let mut resized = Self::zeros(rows, columns);
        if preserve {
            for i in 0..rows.min(self.rows) {
                for j in 0..columns.min(self.columns) {
                    resized[(i, j)] = self[(i, j)];
                }
            }
        }
        *self = resized;
    }

    fn scale(&mut self, scalar: T) {
        for value in &mut self.data {
            *value *= scalar;
        }
    }

    fn div_scalar(&mut self, scalar: T) {
        for value in &mut self.data {
            *value /= scalar;
        }
    }

    fn scale_diagonal(&mut self, scalar: T) {
        for i in 0..self.rows.min(self.columns) {
            self[(i, i)] *= scalar;
        }
    }

    fn non_zeros(&self) -> usize {
        self.data.iter().filter(|v| !v.is_default()).count()
    }

    fn non_zeros_line(&self, line: usize) -> usize {
        DynamicMatrix::line(self, line)
            .iter()
            .filter(|v| !v.is_default())
            .count()
    }

    fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn capacity_line(&self, _line: usize) -> usize {
        DynamicMatrix::line_len(self)
    }
}
