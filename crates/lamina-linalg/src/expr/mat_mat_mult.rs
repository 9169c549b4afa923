//! Matrix times matrix.

use std::borrow::Cow;

use lamina_core::{smp_config, Error, Result, SmpBackend, StorageOrder};
use num_traits::Zero;

use crate::dense_matrix::DynamicMatrix;
use crate::dispatch::EvalMode;
use crate::smp;
use crate::traits::{DenseMatrixExpr, MatrixExpr, Operand};

/// Expression node for `A * B`.
///
/// Always evaluated into a temporary before it is used as an operand. The
/// result has the storage order of `A`.
#[derive(Debug, Clone)]
pub struct MatMatMultExpr<L, R> {
    lhs: L,
    rhs: R,
}

impl<L, R> MatMatMultExpr<L, R>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    /// Creates the node.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `lhs.columns() != rhs.rows()`.
    pub fn new(lhs: L, rhs: R) -> Self {
        debug_assert_eq!(lhs.columns(), rhs.rows(), "invalid matrix sizes");
        Self { lhs, rhs }
    }

    /// Returns the left operand.
    pub fn left_operand(&self) -> &L {
        &self.lhs
    }

    /// Returns the right operand.
    pub fn right_operand(&self) -> &R {
        &self.rhs
    }

    fn compute(&self, mode: EvalMode) -> DynamicMatrix<L::Element, L::Order> {
        let mut result = DynamicMatrix::zeros(self.lhs.rows(), self.rhs.columns());
        let parallel = mode == EvalMode::Parallel
            && result.rows() * result.columns() > smp_config().dmat_dmat_mult_threshold
            && !smp::is_serial_section_active()
            && smp::backend() != SmpBackend::Serial;

        if parallel {
            let line_len = result.line_len();
            smp::partition_lines(result.as_mut_slice(), line_len, |chunk, first| {
                for (k, line) in chunk.chunks_mut(line_len).enumerate() {
                    for (minor, slot) in line.iter_mut().enumerate() {
                        let (row, column) = L::Order::from_line(first + k, minor);
                        *slot = self.at(row, column);
                    }
                }
            });
        } else {
            let columns = self.rhs.columns();
            self.lhs.for_each_non_zero(|i, k, value| {
                for j in 0..columns {
                    result[(i, j)] += value * self.rhs.at(k, j);
                }
            });
        }
        result
    }
}

/// Creates `lhs * rhs`.
///
/// # Errors
///
/// Returns [`Error::SizeMismatch`] if `lhs.columns() != rhs.rows()`.
pub fn mat_mat_mult<L, R>(lhs: L, rhs: R) -> Result<MatMatMultExpr<L, R>>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    if lhs.columns() != rhs.rows() {
        return Err(Error::SizeMismatch {
            expected: lhs.columns(),
            found: rhs.rows(),
        });
    }
    Ok(MatMatMultExpr::new(lhs, rhs))
}

impl<L, R> Operand for MatMatMultExpr<L, R>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    const IS_COMPUTATION: bool = true;
    const REQUIRES_EVALUATION: bool = true;
    const SMP_ASSIGNABLE: bool = L::SMP_ASSIGNABLE && R::SMP_ASSIGNABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        self.lhs.is_aliased(alias) || self.rhs.is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        self.lhs.can_alias(alias) || self.rhs.can_alias(alias)
    }

    fn can_smp_assign(&self) -> bool {
        self.lhs.rows() * self.rhs.columns() > smp_config().dmat_dmat_mult_threshold
    }
}

impl<L, R> MatrixExpr for MatMatMultExpr<L, R>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    type Element = L::Element;
    type Order = L::Order;

    fn rows(&self) -> usize {
        self.lhs.rows()
    }

    fn columns(&self) -> usize {
        self.rhs.columns()
    }

    fn at(&self, row: usize, column: usize) -> L::Element {
        (0..self.lhs.columns()).fold(L::Element::zero(), |acc, k| {
            acc + self.lhs.at(row, k) * self.rhs.at(k, column)
        })
    }

    fn for_each_non_zero<F>(&self, f: F)
    where
        F: FnMut(usize, usize, L::Element),
    {
        self.compute(EvalMode::Serial).for_each_non_zero(f);
    }
}

impl<L, R> DenseMatrixExpr for MatMatMultExpr<L, R>
where
    L: MatrixExpr,
    R: MatrixExpr<Element = L::Element>,
{
    fn evaluate(&self, mode: EvalMode) -> Cow<'_, DynamicMatrix<L::Element, L::Order>> {
        Cow::Owned(self.compute(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse_matrix::CompressedMatrix;
    use lamina_core::{ColumnMajor, RowMajor};

    #[test]
    fn test_product() {
        let a = DynamicMatrix::<i32, RowMajor>::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let b = DynamicMatrix::<i32, ColumnMajor>::from_rows(vec![vec![5, 6], vec![7, 8]]);
        let c = mat_mat_mult(&a, &b).unwrap();
        // [[1*5+2*7, 1*6+2*8], [3*5+4*7, 3*6+4*8]] = [[19, 22], [43, 50]]
        assert_eq!(c.at(0, 0), 19);
        assert_eq!(c.at(1, 1), 50);
        let evaluated = c.evaluate(EvalMode::Serial).into_owned();
        assert_eq!(evaluated.as_slice(), &[19, 22, 43, 50]);
    }

    #[test]
    fn test_sparse_operand() {
        let a = CompressedMatrix::<i64>::from_dense(&[vec![0, 2], vec![1, 0]]);
        let b = DynamicMatrix::<i64>::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let c = DynamicMatrix::<i64>::from_expr(&mat_mat_mult(&a, &b).unwrap());
        assert_eq!(c.as_slice(), &[6, 8, 1, 2]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let n = 64;
        let a = DynamicMatrix::<i64>::from_fn(n, n, |i, j| (i * 3 + j) as i64 % 7 - 3);
        let b = DynamicMatrix::<i64, ColumnMajor>::from_fn(n, n, |i, j| (i + 2 * j) as i64 % 5);
        let c = MatMatMultExpr::new(&a, &b);
        assert!(c.can_smp_assign());
        assert_eq!(
            c.evaluate(EvalMode::Parallel).into_owned(),
            c.evaluate(EvalMode::Serial).into_owned()
        );
    }

    #[test]
    fn test_size_mismatch() {
        let a = DynamicMatrix::<u8>::zeros(2, 3);
        let b = DynamicMatrix::<u8>::zeros(2, 3);
        assert_eq!(
            mat_mat_mult(&a, &b).err(),
            Some(Error::SizeMismatch {
                expected: 3,
                found: 2
            })
        );
    }
}
