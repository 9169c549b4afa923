//! Symmetric matrix adaptor.
//!
//! [`SymmetricMatrix`] wraps a storage matrix and keeps `A(i,j) == A(j,i)`
//! after every public operation. Writes through the adaptor always touch both
//! mirrors; assignments from other matrices are validated before they land.
//!
//! ## Sparse Storage
//!
//! With sparse storage every stored off-diagonal element has a stored mirror.
//! Operations that address elements by position (`erase_at`, `erase_range`,
//! [`SymmetricIterMut`]) rely on this to find the mirror with a single search.

mod iter;
mod proxy;

use std::borrow::Cow;

use lamina_core::{Error, Numeric, Result, StorageOrder, Structure};

use crate::dense_matrix::DynamicMatrix;
use crate::dispatch::EvalMode;
use crate::expr::MatMatMultExpr;
use crate::storage::{MatrixStorage, SparseStorage};
use crate::traits::{address_of, DenseMatrixExpr, MatrixExpr, Operand};

pub use iter::SymmetricIterMut;
pub use proxy::{SymmetricElement, SymmetricEntry, SymmetricValue};

use proxy::mirror_of;

/// A square matrix with `A(i,j) == A(j,i)`.
///
/// # Example
///
/// ```
/// use lamina_linalg::{CompressedMatrix, SymmetricMatrix};
///
/// let mut s = SymmetricMatrix::<CompressedMatrix<f64>>::new(3);
/// s.set(0, 2, 1.5);
/// assert_eq!(s.get(2, 0), 1.5);
/// assert_eq!(s.non_zeros(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricMatrix<MT> {
    matrix: MT,
}

/// Returns true if `m` is square and `m(i,j) == m(j,i)`.
fn is_symmetric_expr<E: MatrixExpr + ?Sized>(m: &E) -> bool {
    let n = m.rows();
    if n != m.columns() {
        return false;
    }
    (0..n).all(|i| (i + 1..n).all(|j| m.at(i, j) == m.at(j, i)))
}

impl<MT: MatrixStorage> SymmetricMatrix<MT> {
    const RESIZABLE: () = assert!(MT::IS_RESIZABLE, "symmetric matrix over fixed-size storage");

    fn wrap(matrix: MT) -> Self {
        let () = Self::RESIZABLE;
        Self { matrix }
    }

    /// Creates an `n x n` zero matrix.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self::wrap(MT::with_dimensions(n, n))
    }

    /// Copies a matrix that must be symmetric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetup`] if `rhs` is not square, is declared
    /// triangular, or is not symmetric. A matrix declared symmetric is
    /// trusted.
    pub fn try_from_matrix<E>(rhs: &E) -> Result<Self>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        if E::STRUCTURE.is_triangular() || rhs.rows() != rhs.columns() {
            return Err(Error::InvalidSetup);
        }
        let matrix = MT::from_expr(rhs);
        if !E::STRUCTURE.is_symmetric() && !matrix.is_symmetric() {
            return Err(Error::InvalidSetup);
        }
        Ok(Self::wrap(matrix))
    }

    /// Adopts `matrix` as storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetup`] if `matrix` is not symmetric.
    pub fn try_from_storage(matrix: MT) -> Result<Self> {
        if !matrix.is_symmetric() {
            return Err(Error::InvalidSetup);
        }
        Ok(Self::wrap(matrix))
    }

    /// Returns the storage.
    #[must_use]
    pub fn storage(&self) -> &MT {
        &self.matrix
    }

    /// Returns the storage by value.
    #[must_use]
    pub fn into_inner(self) -> MT {
        self.matrix
    }

    /// Rejects operands that cannot keep the matrix symmetric.
    fn check_operand<E>(rhs: &E) -> Result<()>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        if E::STRUCTURE.is_triangular() || rhs.rows() != rhs.columns() {
            return Err(Error::InvalidAssignment);
        }
        if !E::STRUCTURE.is_symmetric() && !is_symmetric_expr(rhs) {
            return Err(Error::InvalidAssignment);
        }
        Ok(())
    }

    /// Evaluates a computation, checking the result instead of the operand.
    fn evaluate_checked<E>(rhs: &E) -> Result<MT>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        if E::STRUCTURE.is_triangular() || rhs.rows() != rhs.columns() {
            return Err(Error::InvalidAssignment);
        }
        let tmp = MT::from_expr(rhs);
        if !E::STRUCTURE.is_symmetric() && !tmp.is_symmetric() {
            return Err(Error::InvalidAssignment);
        }
        Ok(tmp)
    }

    fn check_size<E: MatrixExpr + ?Sized>(&self, rhs: &E) -> Result<()> {
        let n = self.rows();
        if rhs.rows() != n {
            return Err(Error::SizeMismatch {
                expected: n,
                found: rhs.rows(),
            });
        }
        if rhs.columns() != n {
            return Err(Error::SizeMismatch {
                expected: n,
                found: rhs.columns(),
            });
        }
        Ok(())
    }

    /// `self = rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAssignment`] if `rhs` is declared triangular
    /// or is not symmetric. The matrix is unchanged on failure.
    pub fn assign<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        if E::IS_COMPUTATION {
            self.matrix = Self::evaluate_checked(rhs)?;
        } else {
            Self::check_operand(rhs)?;
            self.matrix = MT::from_expr(rhs);
        }
        Ok(())
    }

    /// `self += rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] on mismatched dimensions and
    /// [`Error::InvalidAssignment`] under the rules of [`assign`](Self::assign).
    pub fn add_assign<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        self.check_size(rhs)?;
        if E::IS_COMPUTATION {
            let tmp = Self::evaluate_checked(rhs)?;
            self.matrix.add_expr(&tmp);
        } else {
            Self::check_operand(rhs)?;
            self.matrix.add_expr(rhs);
        }
        Ok(())
    }

    /// `self -= rhs`.
    ///
    /// # Errors
    ///
    /// Same as [`add_assign`](Self::add_assign).
    pub fn sub_assign<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        self.check_size(rhs)?;
        if E::IS_COMPUTATION {
            let tmp = Self::evaluate_checked(rhs)?;
            self.matrix.sub_expr(&tmp);
        } else {
            Self::check_operand(rhs)?;
            self.matrix.sub_expr(rhs);
        }
        Ok(())
    }

    /// `self = self * rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] unless `rhs` is `n x n`, and
    /// [`Error::InvalidAssignment`] if the product is not symmetric.
    pub fn mul_assign<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: MatrixExpr<Element = MT::Element> + ?Sized,
    {
        self.check_size(rhs)?;
        let tmp = MT::from_expr(&MatMatMultExpr::new(&self.matrix, rhs));
        if !tmp.is_symmetric() {
            return Err(Error::InvalidAssignment);
        }
        self.matrix = tmp;
        Ok(())
    }

    /// Multiplies every element by `scalar`.
    pub fn mul_scalar(&mut self, scalar: MT::Element) {
        self.matrix.scale(scalar);
    }

    /// Divides every element by `scalar`.
    pub fn div_scalar(&mut self, scalar: MT::Element) {
        debug_assert!(!scalar.is_default(), "division by zero detected");
        self.matrix.div_scalar(scalar);
    }

    /// Element at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> MT::Element {
        self.matrix.get(i, j)
    }

    /// Write access to `(i, j)` and its mirror.
    pub fn entry(&mut self, i: usize, j: usize) -> SymmetricEntry<'_, MT> {
        debug_assert!(i < self.rows(), "invalid row access index");
        debug_assert!(j < self.columns(), "invalid column access index");
        SymmetricEntry::new(&mut self.matrix, i, j)
    }

    /// Stored `(index, value)` pairs of line `i`.
    pub fn line(&self, i: usize) -> impl Iterator<Item = (usize, MT::Element)> + '_ {
        (0..self.matrix.line_len(i))
            .map(move |pos| (self.matrix.index_at(i, pos), self.matrix.value_at(i, pos)))
    }

    /// Cursor over line `i` whose writes update the mirrors.
    pub fn line_mut(&mut self, i: usize) -> SymmetricIterMut<'_, MT> {
        SymmetricIterMut::new(&mut self.matrix, i)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.matrix.columns()
    }

    /// Number of element slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.matrix.capacity()
    }

    /// Number of element slots of line `i`.
    #[must_use]
    pub fn capacity_line(&self, i: usize) -> usize {
        self.matrix.capacity_line(i)
    }

    /// Number of non-default elements.
    #[must_use]
    pub fn non_zeros(&self) -> usize {
        self.matrix.non_zeros()
    }

    /// Number of non-default elements of line `i`.
    #[must_use]
    pub fn non_zeros_line(&self, i: usize) -> usize {
        self.matrix.non_zeros_line(i)
    }

    /// Position of `(i, j)` within its line.
    #[must_use]
    pub fn find(&self, i: usize, j: usize) -> Option<usize> {
        self.matrix.find(i, j)
    }

    /// First position in the line of `(i, j)` not below it.
    #[must_use]
    pub fn lower_bound(&self, i: usize, j: usize) -> usize {
        self.matrix.lower_bound(i, j)
    }

    /// First position in the line of `(i, j)` above it.
    #[must_use]
    pub fn upper_bound(&self, i: usize, j: usize) -> usize {
        self.matrix.upper_bound(i, j)
    }

    /// Sets every element to zero.
    pub fn reset(&mut self) {
        self.matrix.reset();
    }

    /// Sets line `i` and its mirror elements to zero.
    pub fn reset_line(&mut self, i: usize) {
        for pos in 0..self.matrix.line_len(i) {
            let minor = self.matrix.index_at(i, pos);
            if minor != i {
                let (row, column) = mirror_of::<MT::Order>(i, minor);
                self.matrix.erase_element(row, column);
            }
        }
        self.matrix.reset_line(i);
    }

    /// Shrinks the matrix to `0 x 0`.
    pub fn clear(&mut self) {
        self.matrix.clear();
    }

    /// Changes the matrix to `n x n`.
    pub fn resize(&mut self, n: usize, preserve: bool) {
        self.matrix.resize(n, n, preserve);
    }

    /// Writes `value` to `(i, j)` and `(j, i)` and returns the position of
    /// `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: MT::Element) -> usize {
        if i != j {
            self.matrix.set(j, i, value);
        }
        self.matrix.set(i, j, value)
    }

    /// A symmetric matrix is its own transpose.
    pub fn transpose(&mut self) -> &mut Self {
        self
    }

    /// Multiplies every element by `scalar`.
    pub fn scale(&mut self, scalar: MT::Element) {
        self.matrix.scale(scalar);
    }

    /// Multiplies the diagonal by `scalar`.
    pub fn scale_diagonal(&mut self, scalar: MT::Element) {
        self.matrix.scale_diagonal(scalar);
    }

    /// Exchanges the contents of two matrices.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.matrix, &mut other.matrix);
    }
}

impl<MT: SparseStorage> SymmetricMatrix<MT> {
    /// Creates an `n x n` zero matrix with room for `nonzeros` elements.
    #[must_use]
    pub fn with_capacity(n: usize, nonzeros: usize) -> Self {
        Self::wrap(MT::with_capacity(n, n, nonzeros))
    }

    /// Inserts `(i, j)` and its mirror.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateElement`] if the element is stored; the
    /// matrix is unchanged.
    pub fn insert(&mut self, i: usize, j: usize, value: MT::Element) -> Result<usize> {
        if self.matrix.find(i, j).is_some() {
            return Err(Error::DuplicateElement { row: i, column: j });
        }
        if i != j {
            self.matrix.insert(j, i, value)?;
        }
        self.matrix.insert(i, j, value)
    }

    /// Removes `(i, j)` and its mirror.
    pub fn erase(&mut self, i: usize, j: usize) {
        self.matrix.erase(i, j);
        if i != j {
            self.matrix.erase(j, i);
        }
    }

    /// Removes the element at `pos` of line `i` and its mirror.
    pub fn erase_at(&mut self, i: usize, pos: usize) -> usize {
        if pos >= self.matrix.line_len(i) {
            return pos;
        }
        let minor = self.matrix.index_at(i, pos);
        if minor != i {
            let (row, column) = mirror_of::<MT::Order>(i, minor);
            self.matrix.erase(row, column);
        }
        self.matrix.erase_at(i, pos)
    }

    /// Removes positions `first..last` of line `i` and their mirrors.
    pub fn erase_range(&mut self, i: usize, first: usize, last: usize) -> usize {
        let last = last.min(self.matrix.line_len(i));
        for pos in first..last {
            let minor = self.matrix.index_at(i, pos);
            if minor != i {
                let (row, column) = mirror_of::<MT::Order>(i, minor);
                self.matrix.erase(row, column);
            }
        }
        self.matrix.erase_range(i, first, last)
    }

    /// Appends `(i, j)` behind the last element of its line and inserts the
    /// mirror.
    pub fn append(&mut self, i: usize, j: usize, value: MT::Element, check: bool) {
        self.matrix.append(i, j, value, check);
        if i != j && !(check && value.is_default()) {
            let mirrored = self.matrix.insert(j, i, value);
            debug_assert!(mirrored.is_ok(), "mirror element already stored");
        }
    }

    /// Ends the appends to line `i`.
    pub fn finalize(&mut self, i: usize) {
        self.matrix.finalize(i);
    }

    /// Grows the capacity to at least `nonzeros`.
    pub fn reserve(&mut self, nonzeros: usize) {
        self.matrix.reserve(nonzeros);
    }

    /// Grows the capacity of line `i` to at least `nonzeros`.
    pub fn reserve_line(&mut self, i: usize, nonzeros: usize) {
        self.matrix.reserve_line(i, nonzeros);
    }

    /// Releases all unused capacity.
    pub fn trim(&mut self) {
        self.matrix.trim();
    }

    /// Releases the unused capacity of line `i`.
    pub fn trim_line(&mut self, i: usize) {
        self.matrix.trim_line(i);
    }
}

impl<MT: MatrixStorage> Operand for SymmetricMatrix<MT> {
    const SMP_ASSIGNABLE: bool = MT::SMP_ASSIGNABLE;
    const VECTORIZABLE: bool = MT::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        address_of(self) == alias || self.matrix.is_aliased(alias)
    }

    fn is_aligned(&self) -> bool {
        self.matrix.is_aligned()
    }

    fn can_smp_assign(&self) -> bool {
        self.matrix.can_smp_assign()
    }
}

impl<MT: MatrixStorage> MatrixExpr for SymmetricMatrix<MT> {
    type Element = MT::Element;
    type Order = MT::Order;
    const STRUCTURE: Structure = Structure::Symmetric;

    fn rows(&self) -> usize {
        self.matrix.rows()
    }

    fn columns(&self) -> usize {
        self.matrix.columns()
    }

    fn at(&self, row: usize, column: usize) -> MT::Element {
        self.matrix.at(row, column)
    }

    fn for_each_non_zero<F>(&self, f: F)
    where
        F: FnMut(usize, usize, MT::Element),
    {
        self.matrix.for_each_non_zero(f);
    }
}

impl<T: Numeric, SO: StorageOrder> DenseMatrixExpr for SymmetricMatrix<DynamicMatrix<T, SO>> {
    fn line(&self, index: usize) -> Option<&[T]> {
        Some(self.matrix.line(index))
    }

    fn evaluate(&self, _mode: EvalMode) -> Cow<'_, DynamicMatrix<T, SO>> {
        Cow::Borrowed(&self.matrix)
    }
}
