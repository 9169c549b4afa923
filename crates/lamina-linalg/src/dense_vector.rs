//! Dense vector of dynamic size.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use lamina_core::simd::REGISTER_BYTES;
use lamina_core::{smp_config, ColumnVector, Error, Numeric, Result, TransposeFlag};

use crate::dispatch::{self, AssignOp};
use crate::traits::{address_of, DenseVectorExpr, Operand, VectorExpr};

/// Dense vector with orientation `TF`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicVector<T, TF = ColumnVector> {
    /// Elements.
    data: Vec<T>,
    _tf: PhantomData<TF>,
}

impl<T: Numeric, TF: TransposeFlag> DynamicVector<T, TF> {
    /// Creates a vector of `size` zeros.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::from_vec(vec![T::zero(); size])
    }

    /// Wraps `data`.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data,
            _tf: PhantomData,
        }
    }

    /// Copies `data`.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Evaluates `rhs` into a new vector.
    #[must_use]
    pub fn from_expr<E>(rhs: &E) -> Self
    where
        E: DenseVectorExpr<Element = T, Transpose = TF> + ?Sized,
    {
        let mut v = Self::new(rhs.size());
        dispatch::smp_assign(&mut v.data, &rhs, AssignOp::Assign);
        v
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the elements mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the vector and returns its elements.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the transposed vector, sharing the same elements.
    #[must_use]
    pub fn transpose(self) -> DynamicVector<T, TF::Opposite> {
        DynamicVector::from_vec(self.data)
    }

    /// Changes the size, filling new elements with zero.
    pub fn resize(&mut self, size: usize) {
        self.data.resize(size, T::zero());
    }

    /// Sets every element to zero.
    pub fn reset(&mut self) {
        self.data.fill(T::zero());
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
        if self.len() != rhs.size() {
            return Err(Error::SizeMismatch {
                expected: self.len(),
                found: rhs.size(),
            });
        }
        dispatch::smp_assign(&mut self.data, rhs, op);
        Ok(())
    }
}

impl<T, TF> Index<usize> for DynamicVector<T, TF> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, TF> IndexMut<usize> for DynamicVector<T, TF> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: Numeric, TF: TransposeFlag> Operand for DynamicVector<T, TF> {
    const SMP_ASSIGNABLE: bool = true;
    const VECTORIZABLE: bool = T::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        address_of(self) == alias
    }

    fn is_aligned(&self) -> bool {
        (self.data.as_ptr() as usize) % REGISTER_BYTES == 0
    }

    fn can_smp_assign(&self) -> bool {
        self.len() > smp_config().dvec_assign_threshold
    }
}

impl<T: Numeric, TF: TransposeFlag> VectorExpr for DynamicVector<T, TF> {
    type Element = T;
    type Transpose = TF;

    fn size(&self) -> usize {
        self.data.len()
    }
}

impl<T: Numeric, TF: TransposeFlag> DenseVectorExpr for DynamicVector<T, TF> {
    fn at(&self, index: usize) -> T {
        self.data[index]
    }

    fn assign_range(&self, out: &mut [T], offset: usize, op: AssignOp) {
        let src = &self.data[offset..offset + out.len()];
        match op {
            AssignOp::Assign => T::copy(out, src),
            AssignOp::Add => T::axpy(out, T::one(), src),
            AssignOp::Sub | AssignOp::Mult => {
                for (slot, &value) in out.iter_mut().zip(src) {
                    op.apply(slot, value);
                }
            }
        }
    }
}
