//! Sparse vector with sorted index storage.

use std::borrow::Cow;
use std::marker::PhantomData;

use lamina_core::{ColumnVector, Error, Numeric, Result, TransposeFlag};

use crate::dense_vector::DynamicVector;
use crate::dispatch::{self, AssignOp, EvalMode};
use crate::traits::{address_of, DenseVectorExpr, Operand, SparseVectorExpr, VectorExpr};

/// Sparse vector storing `(index, value)` pairs sorted by index.
///
/// # Memory Layout
///
/// - `indices`: strictly increasing element indices
/// - `values`: the value of each stored element
///
/// Positions (`0..non_zeros()`) address the stored elements in index order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressedVector<T, TF = ColumnVector> {
    /// Logical size.
    size: usize,
    /// Indices of the stored elements.
    indices: Vec<usize>,
    /// Values of the stored elements.
    values: Vec<T>,
    _tf: PhantomData<TF>,
}

impl<T: Numeric, TF: TransposeFlag> CompressedVector<T, TF> {
    /// Creates an empty vector of logical size `size`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_capacity(size, 0)
    }

    /// Creates an empty vector with room for `nonzeros` elements.
    #[must_use]
    pub fn with_capacity(size: usize, nonzeros: usize) -> Self {
        Self {
            size,
            indices: Vec::with_capacity(nonzeros),
            values: Vec::with_capacity(nonzeros),
            _tf: PhantomData,
        }
    }

    /// Creates a vector from the nonzero elements of `dense`.
    #[must_use]
    pub fn from_dense(dense: &DynamicVector<T, TF>) -> Self {
        let mut v = Self::new(dense.len());
        for (i, &value) in dense.as_slice().iter().enumerate() {
            v.append(i, value, true);
        }
        v
    }

    /// Evaluates `rhs` into a new sparse vector.
    #[must_use]
    pub fn from_expr<E>(rhs: &E) -> Self
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        let mut v = Self::new(rhs.size());
        dispatch::assign_sparse(&mut v, rhs, AssignOp::Assign);
        v
    }

    /// Converts to a dense vector.
    #[must_use]
    pub fn to_dense(&self) -> DynamicVector<T, TF> {
        let mut dense = DynamicVector::new(self.size);
        for (i, value) in self.entries() {
            dense[i] = value;
        }
        dense
    }

    /// Returns the logical size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of stored elements.
    #[must_use]
    pub fn non_zeros(&self) -> usize {
        self.indices.len()
    }

    /// Returns the number of elements that fit without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Returns the element at `index`, zero if it is not stored.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        self.find(index).map_or_else(T::zero, |pos| self.values[pos])
    }

    /// Returns the position of the element at `index`, if stored.
    #[must_use]
    pub fn find(&self, index: usize) -> Option<usize> {
        self.indices.binary_search(&index).ok()
    }

    /// Position of the first stored element with index `>= index`.
    #[must_use]
    pub fn lower_bound(&self, index: usize) -> usize {
        self.indices.partition_point(|&i| i < index)
    }

    /// Position of the first stored element with index `> index`.
    #[must_use]
    pub fn upper_bound(&self, index: usize) -> usize {
        self.indices.partition_point(|&i| i <= index)
    }

    /// Index of the element at position `pos`.
    #[must_use]
    pub fn index_at(&self, pos: usize) -> usize {
        self.indices[pos]
    }

    /// Value of the element at position `pos`.
    #[must_use]
    pub fn value_at(&self, pos: usize) -> T {
        self.values[pos]
    }

    /// Iterates over the stored `(index, value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Stores `value` at `index`, overwriting an existing element.
    ///
    /// Returns the position of the element.
    pub fn set(&mut self, index: usize, value: T) -> usize {
        debug_assert!(index < self.size, "invalid vector access index");
        match self.indices.binary_search(&index) {
            Ok(pos) => {
                self.values[pos] = value;
                pos
            }
            Err(pos) => {
                self.indices.insert(pos, index);
                self.values.insert(pos, value);
                pos
            }
        }
    }

    /// Inserts a new element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateElement`] if the element is already stored.
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize> {
        debug_assert!(index < self.size, "invalid vector access index");
        match self.indices.binary_search(&index) {
            Ok(_) => {
                let (row, column) = if TF::IS_ROW_VECTOR {
                    (0, index)
                } else {
                    (index, 0)
                };
                Err(Error::DuplicateElement { row, column })
            }
            Err(pos) => {
                self.indices.insert(pos, index);
                self.values.insert(pos, value);
                Ok(pos)
            }
        }
    }

    /// Removes the element at `index`, if stored.
    pub fn erase(&mut self, index: usize) {
        if let Some(pos) = self.find(index) {
            self.indices.remove(pos);
            self.values.remove(pos);
        }
    }

    /// Appends an element behind the last stored one.
    ///
    /// With `check` set, default values are skipped.
    pub fn append(&mut self, index: usize, value: T, check: bool) {
        debug_assert!(index < self.size, "invalid vector access index");
        debug_assert!(
            self.indices.last().map_or(true, |&last| last < index),
            "index is not strictly increasing"
        );
        if check && value.is_default() {
            return;
        }
        self.indices.push(index);
        self.values.push(value);
    }

    /// Reserves room for `nonzeros` elements in total.
    pub fn reserve(&mut self, nonzeros: usize) {
        let extra = nonzeros.saturating_sub(self.non_zeros());
        self.indices.reserve(extra);
        self.values.reserve(extra);
    }

    /// Removes every stored element.
    pub fn reset(&mut self) {
        self.indices.clear();
        self.values.clear();
    }

    /// Changes the logical size, dropping elements beyond it.
    pub fn resize(&mut self, size: usize) {
        let keep = self.lower_bound(size);
        self.indices.truncate(keep);
        self.values.truncate(keep);
        self.size = size;
    }

    /// Multiplies every stored element by `scalar`.
    pub fn scale(&mut self, scalar: T) {
        for value in &mut self.values {
            *value *= scalar;
        }
    }

    /// Returns a copy with every stored element multiplied by `scalar`.
    #[must_use]
    pub fn scaled(&self, scalar: T) -> Self {
        let mut v = self.clone();
        v.scale(scalar);
        v
    }

    /// Returns the transposed vector.
    #[must_use]
    pub fn transpose(self) -> CompressedVector<T, TF::Opposite> {
        CompressedVector {
            size: self.size,
            indices: self.indices,
            values: self.values,
            _tf: PhantomData,
        }
    }

    /// `self = rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the sizes differ.
    pub fn assign<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        self.apply(rhs, AssignOp::Assign)
    }

    /// `self += rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the sizes differ.
    pub fn add_assign_expr<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        self.apply(rhs, AssignOp::Add)
    }

    /// `self -= rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the sizes differ.
    pub fn sub_assign_expr<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        self.apply(rhs, AssignOp::Sub)
    }

    /// Element-wise `self *= rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the sizes differ.
    pub fn mult_assign_expr<E>(&mut self, rhs: &E) -> Result<()>
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        self.apply(rhs, AssignOp::Mult)
    }

    fn apply<E>(&mut self, rhs: &E, op: AssignOp) -> Result<()>
    where
        E: DenseVectorExpr<Element = T, Transpose = TF>,
    {
        if self.size != rhs.size() {
            return Err(Error::SizeMismatch {
                expected: self.size,
                found: rhs.size(),
            });
        }
        dispatch::assign_sparse(self, rhs, op);
        Ok(())
    }
}

impl<T: Numeric, TF: TransposeFlag> Operand for CompressedVector<T, TF> {
    const SMP_ASSIGNABLE: bool = true;

    fn is_aliased(&self, alias: *const ()) -> bool {
        address_of(self) == alias
    }
}

impl<T: Numeric, TF: TransposeFlag> VectorExpr for CompressedVector<T, TF> {
    type Element = T;
    type Transpose = TF;

    fn size(&self) -> usize {
        self.size
    }
}

impl<T: Numeric, TF: TransposeFlag> SparseVectorExpr for CompressedVector<T, TF> {
    fn non_zeros(&self) -> usize {
        self.indices.len()
    }

    fn evaluate(&self, _mode: EvalMode) -> Cow<'_, Self> {
        Cow::Borrowed(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::RowVector;

    fn sample() -> CompressedVector<i32, RowVector> {
        let mut v = CompressedVector::new(8);
        v.set(5, 50);
        v.set(1, 10);
        v.set(3, 30);
        v
    }

    #[test]
    fn test_sorted_storage() {
        let v = sample();
        assert_eq!(v.entries().collect::<Vec<_>>(), vec![(1, 10), (3, 30), (5, 50)]);
        assert_eq!(v.get(3), 30);
        assert_eq!(v.get(4), 0);
    }

    #[test]
    fn test_bounds() {
        let v = sample();
        assert_eq!(v.lower_bound(3), 1);
        assert_eq!(v.upper_bound(3), 2);
        assert_eq!(v.lower_bound(0), 0);
        assert_eq!(v.upper_bound(7), 3);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut v = sample();
        assert_eq!(
            v.insert(3, 1),
            Err(Error::DuplicateElement { row: 0, column: 3 })
        );
        assert_eq!(v.insert(4, 40), Ok(2));
        assert_eq!(v.non_zeros(), 4);
    }

    #[test]
    fn test_append_skips_defaults() {
        let mut v = CompressedVector::<f64>::new(4);
        v.append(0, 1.0, true);
        v.append(1, 0.0, true);
        v.append(2, 0.0, false);
        assert_eq!(v.non_zeros(), 2);
    }

    #[test]
    fn test_resize_and_erase() {
        let mut v = sample();
        v.erase(1);
        v.erase(2);
        assert_eq!(v.non_zeros(), 2);
        v.resize(4);
        assert_eq!(v.entries().collect::<Vec<_>>(), vec![(3, 30)]);
    }

    #[test]
    fn test_dense_round_trip() {
        let v = sample();
        let dense = v.to_dense();
        assert_eq!(dense.as_slice(), &[0, 10, 0, 30, 0, 50, 0, 0]);
        assert_eq!(CompressedVector::from_dense(&dense), v);
    }

    #[test]
    fn test_assign_from_dense_expr() {
        let mut v = sample();
        let dense = DynamicVector::<i32, RowVector>::from_slice(&[1, -10, 0, 0, 0, 0, 0, 2]);
        v.add_assign_expr(&dense).unwrap();
        assert_eq!(
            v.entries().collect::<Vec<_>>(),
            vec![(0, 1), (3, 30), (5, 50), (7, 2)]
        );
    }
}
