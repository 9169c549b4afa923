//! Unchecked structure declarations.
//!
//! `declare_upper(&a)` tells the expression layer that `a` is upper
//! triangular without verifying it. Kernels then skip the part of the
//! computation that would only meet zeros.

use std::borrow::Cow;
use std::marker::PhantomData;

use lamina_core::{
    LowerTag, StrictlyLowerTag, StrictlyUpperTag, Structure, StructureTag, SymmetricTag, UpperTag,
};

use crate::dense_matrix::DynamicMatrix;
use crate::dispatch::EvalMode;
use crate::traits::{DenseMatrixExpr, MatrixExpr, Operand};

/// A matrix operand carrying the structure `S`.
#[derive(Debug, Clone)]
pub struct Declared<M, S> {
    mat: M,
    _structure: PhantomData<S>,
}

impl<M: MatrixExpr, S: StructureTag> Declared<M, S> {
    /// Wraps `mat`.
    pub fn new(mat: M) -> Self {
        Self {
            mat,
            _structure: PhantomData,
        }
    }

    /// Returns the declared operand.
    pub fn operand(&self) -> &M {
        &self.mat
    }

    /// Returns the declared operand by value.
    pub fn into_inner(self) -> M {
        self.mat
    }
}

/// Declares `mat` symmetric.
pub fn declare_symmetric<M: MatrixExpr>(mat: M) -> Declared<M, SymmetricTag> {
    Declared::new(mat)
}

/// Declares `mat` lower triangular.
pub fn declare_lower<M: MatrixExpr>(mat: M) -> Declared<M, LowerTag> {
    Declared::new(mat)
}

/// Declares `mat` upper triangular.
pub fn declare_upper<M: MatrixExpr>(mat: M) -> Declared<M, UpperTag> {
    Declared::new(mat)
}

/// Declares `mat` strictly lower triangular.
pub fn declare_strictly_lower<M: MatrixExpr>(mat: M) -> Declared<M, StrictlyLowerTag> {
    Declared::new(mat)
}

/// Declares `mat` strictly upper triangular.
pub fn declare_strictly_upper<M: MatrixExpr>(mat: M) -> Declared<M, StrictlyUpperTag> {
    Declared::new(mat)
}

impl<M: MatrixExpr, S: StructureTag> Operand for Declared<M, S> {
    const IS_COMPUTATION: bool = M::IS_COMPUTATION;
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

impl<M: MatrixExpr, S: StructureTag> MatrixExpr for Declared<M, S> {
    type Element = M::Element;
    type Order = M::Order;
    const STRUCTURE: Structure = S::STRUCTURE;

    fn rows(&self) -> usize {
        self.mat.rows()
    }

    fn columns(&self) -> usize {
        self.mat.columns()
    }

    fn at(&self, row: usize, column: usize) -> M::Element {
        self.mat.at(row, column)
    }

    fn for_each_non_zero<F>(&self, f: F)
    where
        F: FnMut(usize, usize, M::Element),
    {
        self.mat.for_each_non_zero(f);
    }
}

impl<M: DenseMatrixExpr, S: StructureTag> DenseMatrixExpr for Declared<M, S> {
    fn line(&self, index: usize) -> Option<&[M::Element]> {
        self.mat.line(index)
    }

    fn evaluate(&self, mode: EvalMode) -> Cow<'_, DynamicMatrix<M::Element, M::Order>> {
        self.mat.evaluate(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_is_declared_not_checked() {
        let m = DynamicMatrix::<i32>::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let lower = declare_lower(&m);
        assert_eq!(<Declared<&DynamicMatrix<i32>, LowerTag>>::STRUCTURE, Structure::Lower);
        assert_eq!(lower.at(0, 1), 2);
        assert_eq!(declare_symmetric(&m).line(1), Some(&[3, 4][..]));
        assert!(lower.is_aliased(crate::traits::address_of(&m)));
    }
}
