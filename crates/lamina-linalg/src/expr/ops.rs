//! Operator entry points for `x * A`.
//!
//! The right operand is routed before the node is built. Symmetric operands
//! are replaced by the transpose of their storage, which holds the same values
//! and presents a general structure, so the multiplication node never sees a
//! column-major symmetric matrix.

use std::ops::Mul;

use lamina_core::{
    Error, LowerTag, Numeric, Result, RowVector, StorageOrder, StrictlyLowerTag, StrictlyUpperTag,
    SymmetricTag, UpperTag,
};

use crate::dense_matrix::DynamicMatrix;
use crate::expr::{
    trans, DMatTransExpr, Declared, MatMatMultExpr, SVecDMatMultExpr, SVecScalarMultExpr,
};
use crate::sparse_vector::CompressedVector;
use crate::symmetric::SymmetricMatrix;
use crate::traits::{DenseMatrixExpr, MatrixExpr, SparseVectorExpr, VectorExpr};

/// A right operand of sparse row vector times matrix.
pub trait TVecMultRhs {
    /// The operand the multiplication node stores.
    type Routed: DenseMatrixExpr;

    /// Converts the operand into its routed form.
    fn route(self) -> Self::Routed;
}

impl<'a, T: Numeric, SO: StorageOrder> TVecMultRhs for &'a DynamicMatrix<T, SO> {
    type Routed = Self;

    fn route(self) -> Self {
        self
    }
}

impl<'a, T: Numeric, SO: StorageOrder> TVecMultRhs for &'a SymmetricMatrix<DynamicMatrix<T, SO>> {
    type Routed = DMatTransExpr<&'a DynamicMatrix<T, SO>>;

    fn route(self) -> Self::Routed {
        trans(self.storage())
    }
}

impl<M: DenseMatrixExpr> TVecMultRhs for Declared<M, SymmetricTag> {
    type Routed = DMatTransExpr<M>;

    fn route(self) -> Self::Routed {
        trans(self.into_inner())
    }
}

macro_rules! route_unchanged {
    ($($tag:ty),*) => {
        $(
            impl<M: DenseMatrixExpr> TVecMultRhs for Declared<M, $tag> {
                type Routed = Self;

                fn route(self) -> Self {
                    self
                }
            }
        )*
    };
}

route_unchanged!(LowerTag, UpperTag, StrictlyLowerTag, StrictlyUpperTag);

impl<M: DenseMatrixExpr> TVecMultRhs for DMatTransExpr<M> {
    type Routed = Self;

    fn route(self) -> Self {
        self
    }
}

impl<L, R> TVecMultRhs for MatMatMultExpr<L, R>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    type Routed = Self;

    fn route(self) -> Self {
        self
    }
}

/// Builds `vec * mat`.
///
/// # Errors
///
/// Returns [`Error::SizeMismatch`] if `vec.size() != mat.rows()`.
pub fn multiply<V, M>(vec: V, mat: M) -> Result<SVecDMatMultExpr<V, M::Routed>>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: TVecMultRhs,
    M::Routed: DenseMatrixExpr<Element = V::Element>,
{
    let mat = mat.route();
    if vec.size() != mat.rows() {
        return Err(Error::SizeMismatch {
            expected: mat.rows(),
            found: vec.size(),
        });
    }
    Ok(SVecDMatMultExpr::new(vec, mat))
}

impl<'a, T, M> Mul<M> for &'a CompressedVector<T, RowVector>
where
    T: Numeric,
    M: TVecMultRhs,
    M::Routed: DenseMatrixExpr<Element = T>,
{
    type Output = SVecDMatMultExpr<Self, M::Routed>;

    /// # Panics
    ///
    /// Panics if the vector size does not match the number of matrix rows.
    fn mul(self, rhs: M) -> Self::Output {
        multiply(self, rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl<V, M> Mul<M> for SVecScalarMultExpr<V>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: TVecMultRhs,
    M::Routed: DenseMatrixExpr<Element = V::Element>,
{
    type Output = SVecDMatMultExpr<Self, M::Routed>;

    /// # Panics
    ///
    /// Panics if the vector size does not match the number of matrix rows.
    fn mul(self, rhs: M) -> Self::Output {
        multiply(self, rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}
