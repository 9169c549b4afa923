//! Sparse row vector times dense matrix.

use lamina_core::{smp_config, ColumnVector, RowVector, StorageOrder};
use num_traits::Zero;

use crate::dense_vector::DynamicVector;
use crate::dispatch::{self, AssignOp, EvalMode};
use crate::traits::{
    DenseMatrixExpr, DenseVectorExpr, MatrixExpr, Operand, SparseVectorExpr, VectorExpr,
};

/// Result type of evaluating `x * A`.
pub type MultResult<V> = DynamicVector<<V as VectorExpr>::Element, RowVector>;

/// Transposed result type of `x * A`.
pub type MultTranspose<V> = DynamicVector<<V as VectorExpr>::Element, ColumnVector>;

/// Expression node for `y = x * A`, with `x` a sparse row vector and `A` a
/// dense matrix.
///
/// Element `j` of the result is the sparse dot product of `x` with column
/// `j` of `A`. When `A` is declared triangular only the part of `x` that can
/// meet nonzeros of that column is visited.
///
/// Column-major symmetric matrices are rejected at compile time; route them
/// through [`multiply`](crate::multiply), which transposes them first.
#[derive(Debug, Clone)]
pub struct SVecDMatMultExpr<V, M> {
    vec: V,
    mat: M,
}

impl<V, M> SVecDMatMultExpr<V, M>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: DenseMatrixExpr<Element = V::Element>,
{
    /// The vector operand is a computation and is evaluated before use.
    const EVALUATE_VECTOR: bool = V::IS_COMPUTATION || V::REQUIRES_EVALUATION;

    /// The matrix operand is evaluated before use.
    const EVALUATE_MATRIX: bool = M::REQUIRES_EVALUATION;

    const NOT_SYMMETRIC_COLUMN_MAJOR: () = assert!(
        !(<M::Order as StorageOrder>::IS_COLUMN_MAJOR && M::STRUCTURE.is_symmetric()),
        "column-major symmetric matrix operand"
    );

    /// Creates the node.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `vec.size() != mat.rows()`.
    pub fn new(vec: V, mat: M) -> Self {
        let () = Self::NOT_SYMMETRIC_COLUMN_MAJOR;
        debug_assert_eq!(vec.size(), mat.rows(), "invalid vector and matrix sizes");
        Self { vec, mat }
    }

    /// Returns the vector operand.
    pub fn left_operand(&self) -> &V {
        &self.vec
    }

    /// Returns the matrix operand.
    pub fn right_operand(&self) -> &M {
        &self.mat
    }
}

impl<V, M> Operand for SVecDMatMultExpr<V, M>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: DenseMatrixExpr<Element = V::Element>,
{
    const IS_COMPUTATION: bool = true;
    const REQUIRES_EVALUATION: bool = Self::EVALUATE_VECTOR || Self::EVALUATE_MATRIX;
    const SMP_ASSIGNABLE: bool = !Self::EVALUATE_VECTOR
        && V::SMP_ASSIGNABLE
        && !Self::EVALUATE_MATRIX
        && M::SMP_ASSIGNABLE;
    const VECTORIZABLE: bool = false;

    fn is_aliased(&self, alias: *const ()) -> bool {
        self.vec.is_aliased(alias) || self.mat.is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        self.vec.can_alias(alias) || self.mat.can_alias(alias)
    }

    fn is_aligned(&self) -> bool {
        self.mat.is_aligned()
    }

    fn can_smp_assign(&self) -> bool {
        self.size() > smp_config().tsvec_dmat_mult_threshold
    }
}

impl<V, M> VectorExpr for SVecDMatMultExpr<V, M>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: DenseMatrixExpr<Element = V::Element>,
{
    type Element = V::Element;
    type Transpose = RowVector;

    fn size(&self) -> usize {
        self.mat.columns()
    }
}

impl<V, M> DenseVectorExpr for SVecDMatMultExpr<V, M>
where
    V: SparseVectorExpr<Transpose = RowVector>,
    M: DenseMatrixExpr<Element = V::Element>,
{
    const USE_ASSIGN: bool = Self::EVALUATE_VECTOR || Self::EVALUATE_MATRIX;

    fn at(&self, index: usize) -> V::Element {
        debug_assert!(index < self.mat.columns(), "invalid vector access index");

        let x = self.vec.evaluate(EvalMode::Serial);
        let (begin, end) = dispatch::band(&x, M::STRUCTURE, index);
        let mut sum = V::Element::zero();
        for pos in begin..end {
            sum += x.value_at(pos) * self.mat.at(x.index_at(pos), index);
        }
        sum
    }

    fn assign_range(&self, out: &mut [V::Element], offset: usize, op: AssignOp) {
        let x = self.vec.evaluate(EvalMode::Serial);
        if x.non_zeros() == 0 {
            dispatch::assign_zero(out, op);
            return;
        }
        dispatch::tsvec_dmat_kernel(out, &x, &self.mat, M::STRUCTURE, offset, op);
    }

    fn assign_to(&self, out: &mut [V::Element], op: AssignOp) {
        let x = self.vec.evaluate(EvalMode::Serial);
        if x.non_zeros() == 0 {
            dispatch::assign_zero(out, op);
            return;
        }
        let a = self.mat.evaluate(EvalMode::Serial);
        dispatch::tsvec_dmat_kernel(out, &x, &*a, M::STRUCTURE, 0, op);
    }

    fn smp_assign_to(&self, out: &mut [V::Element], op: AssignOp) {
        let x = self.vec.evaluate(EvalMode::Parallel);
        if x.non_zeros() == 0 {
            dispatch::assign_zero(out, op);
            return;
        }
        let a = self.mat.evaluate(EvalMode::Parallel);
        dispatch::smp_assign(out, &SVecDMatMultExpr::new(&*x, &*a), op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense_matrix::DynamicMatrix;
    use crate::expr::{declare_strictly_lower, declare_upper, mat_mat_mult, scaled};
    use crate::sparse_vector::CompressedVector;
    use lamina_core::{ColumnMajor, RowMajor};

    fn vector() -> CompressedVector<i64, RowVector> {
        let mut x = CompressedVector::new(3);
        x.set(0, 2);
        x.set(2, -1);
        x
    }

    fn rows() -> Vec<Vec<i64>> {
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]
    }

    #[test]
    fn test_flags() {
        type Plain<'a> = SVecDMatMultExpr<
            &'a CompressedVector<i64, RowVector>,
            &'a DynamicMatrix<i64, ColumnMajor>,
        >;
        type Scaled<'a> = SVecDMatMultExpr<
            crate::SVecScalarMultExpr<&'a CompressedVector<i64, RowVector>>,
            &'a DynamicMatrix<i64, ColumnMajor>,
        >;
        type Product<'a> = SVecDMatMultExpr<
            &'a CompressedVector<i64, RowVector>,
            crate::MatMatMultExpr<&'a DynamicMatrix<i64>, &'a DynamicMatrix<i64>>,
        >;

        assert!(!Plain::USE_ASSIGN);
        assert!(Plain::SMP_ASSIGNABLE);
        assert!(!Plain::REQUIRES_EVALUATION);
        assert!(Scaled::USE_ASSIGN);
        assert!(!Scaled::SMP_ASSIGNABLE);
        assert!(Product::USE_ASSIGN);
        assert!(Product::REQUIRES_EVALUATION);
        assert!(!Plain::VECTORIZABLE);
    }

    #[test]
    fn test_elementwise_access() {
        let x = vector();
        let a = DynamicMatrix::<i64, ColumnMajor>::from_rows(rows());
        let expr = SVecDMatMultExpr::new(&x, &a);
        assert_eq!(expr.size(), 3);
        assert_eq!(expr.at(0), 2 - 7);
        assert_eq!(expr.at(1), 4 - 8);
        assert_eq!(expr.at(2), 6 - 9);
    }

    #[test]
    fn test_triangular_band() {
        let x = vector();
        let upper = DynamicMatrix::<i64, RowMajor>::from_rows(vec![
            vec![1, 2, 3],
            vec![0, 5, 6],
            vec![0, 0, 9],
        ]);
        let expr = SVecDMatMultExpr::new(&x, declare_upper(&upper));
        assert_eq!(expr.at(0), 2);
        assert_eq!(expr.at(2), 6 - 9);

        let strictly_lower = DynamicMatrix::<i64, RowMajor>::from_rows(vec![
            vec![0, 0, 0],
            vec![4, 0, 0],
            vec![7, 8, 0],
        ]);
        let expr = SVecDMatMultExpr::new(&x, declare_strictly_lower(&strictly_lower));
        assert_eq!(expr.at(0), -7);
        assert_eq!(expr.at(2), 0);
    }

    #[test]
    fn test_bulk_paths_match_elementwise() {
        let x = vector();
        let a = DynamicMatrix::<i64, RowMajor>::from_rows(rows());
        let b = DynamicMatrix::<i64, RowMajor>::identity(3);
        let want = DynamicVector::<i64, RowVector>::from_slice(&[-5, -4, -3]);

        let product = SVecDMatMultExpr::new(&x, mat_mat_mult(&a, &b).unwrap());
        assert_eq!(product.eval(), want);

        let doubled = SVecDMatMultExpr::new(scaled(&x, 2), &a);
        assert_eq!(doubled.eval().as_slice(), &[-10, -8, -6]);
    }

    #[test]
    fn test_zero_vector_keeps_target_for_add() {
        let x = CompressedVector::<f64, RowVector>::new(2);
        let a = DynamicMatrix::<f64, RowMajor>::identity(2);
        let expr = SVecDMatMultExpr::new(scaled(&x, 3.0), &a);

        let mut y = DynamicVector::<f64, RowVector>::from_slice(&[1.0, 2.0]);
        y.add_assign_expr(&expr).unwrap();
        assert_eq!(y.as_slice(), &[1.0, 2.0]);
        y.assign(&expr).unwrap();
        assert_eq!(y.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_aliasing() {
        let x = vector();
        let a = DynamicMatrix::<i64, ColumnMajor>::from_rows(rows());
        let other = DynamicMatrix::<i64, ColumnMajor>::identity(3);
        let expr = SVecDMatMultExpr::new(&x, &a);
        assert!(expr.is_aliased(crate::traits::address_of(&a)));
        assert!(expr.is_aliased(crate::traits::address_of(&x)));
        assert!(!expr.can_alias(crate::traits::address_of(&other)));
    }
}
