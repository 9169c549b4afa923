//! Transposed view of a dense matrix.

use std::borrow::Cow;

use lamina_core::{StorageOrder, Structure};

use crate::dense_matrix::DynamicMatrix;
use crate::dispatch::EvalMode;
use crate::traits::{DenseMatrixExpr, MatrixExpr, Operand};

/// Expression node for `trans(A)`.
///
/// The view swaps rows and columns and flips the storage order, so line `l`
/// of the view is line `l` of the operand.
#[derive(Debug, Clone)]
pub struct DMatTransExpr<M> {
    mat: M,
}

impl<M: DenseMatrixExpr> DMatTransExpr<M> {
    /// Creates the node.
    pub fn new(mat: M) -> Self {
        Self { mat }
    }

    /// Returns the transposed operand.
    pub fn operand(&self) -> &M {
        &self.mat
    }

    /// Returns the transposed operand by value.
    pub fn into_inner(self) -> M {
        self.mat
    }
}

/// Transposes `mat` without copying it.
pub fn trans<M: DenseMatrixExpr>(mat: M) -> DMatTransExpr<M> {
    DMatTransExpr::new(mat)
}

impl<M: DenseMatrixExpr> Operand for DMatTransExpr<M> {
    const IS_COMPUTATION: bool = false;
    const REQUIRES_EVALUATION: bool = M::REQUIRES_EVALUATION;
    const SMP_ASSIGNABLE: bool = M::SMP_ASSIGNABLE;
    const VECTORIZABLE: bool = M::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        self.mat.is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        self.mat.can_alias(alias)
    }

    fn is_aligned(&self) -> bool {
        self.mat.is_aligned()
    }

    fn can_smp_assign(&self) -> bool {
        self.mat.can_smp_assign()
    }
}

impl<M: DenseMatrixExpr> MatrixExpr for DMatTransExpr<M> {
    type Element = M::Element;
    type Order = <M::Order as StorageOrder>::Opposite;
    const STRUCTURE: Structure = M::STRUCTURE.transposed();

    fn rows(&self) -> usize {
        self.mat.columns()
    }

    fn columns(&self) -> usize {
        self.mat.rows()
    }

    fn at(&self, row: usize, column: usize) -> M::Element {
        self.mat.at(column, row)
    }

    fn for_each_non_zero<F>(&self, mut f: F)
    where
        F: FnMut(usize, usize, M::Element),
    {
        self.mat
            .for_each_non_zero(|row, column, value| f(column, row, value));
    }
}

impl<M: DenseMatrixExpr> DenseMatrixExpr for DMatTransExpr<M> {
    fn line(&self, index: usize) -> Option<&[M::Element]> {
        self.mat.line(index)
    }

    fn evaluate(&self, mode: EvalMode) -> Cow<'_, DynamicMatrix<M::Element, Self::Order>> {
        Cow::Owned(self.mat.evaluate(mode).into_owned().into_opposite())
    }
}
