//! Assignment dispatcher.
//!
//! Every write of an expression into a vector goes through this module. The
//! dispatcher looks at the expression's flags and picks one of three paths:
//!
//! ```text
//! USE_ASSIGN            -> rhs.assign_to / rhs.smp_assign_to (bulk kernel)
//! SMP_ASSIGNABLE + big  -> smp::partition + rhs.assign_range (parallel)
//! otherwise             -> rhs.assign_range over the whole target (serial)
//! ```
//!
//! The sparse-vector times dense-matrix kernels also live here, selected by
//! [`MultKernel`] from the storage order of the matrix operand.

use lamina_core::{Numeric, SmpBackend, StorageOrder, Structure, TransposeFlag};
use tracing::trace;

use crate::dense_vector::DynamicVector;
use crate::smp;
use crate::sparse_vector::CompressedVector;
use crate::traits::{DenseMatrixExpr, DenseVectorExpr};

/// Compound operation applied while assigning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `out = rhs`
    #[default]
    Assign,
    /// `out += rhs`
    Add,
    /// `out -= rhs`
    Sub,
    /// `out *= rhs`, element-wise
    Mult,
}

impl AssignOp {
    /// Applies the operation to a single slot.
    #[inline]
    pub fn apply<T: Numeric>(self, slot: &mut T, value: T) {
        match self {
            Self::Assign => *slot = value,
            Self::Add => *slot += value,
            Self::Sub => *slot -= value,
            Self::Mult => *slot *= value,
        }
    }

    /// Returns true if the operation leaves the target untouched for a zero
    /// right-hand side.
    #[inline]
    #[must_use]
    pub const fn is_identity_for_zero(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }
}

/// Whether nested evaluation of an operand may run in parallel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Evaluate on the calling thread.
    #[default]
    Serial,
    /// Evaluate with the configured parallel backend.
    Parallel,
}

/// Serial assignment of `rhs` into `out`.
///
/// # Panics
///
/// Panics in debug builds if `out.len() != rhs.size()`.
pub fn assign<E: DenseVectorExpr>(out: &mut [E::Element], rhs: &E, op: AssignOp) {
    debug_assert_eq!(out.len(), rhs.size(), "invalid vector sizes");

    if E::USE_ASSIGN {
        trace!(size = out.len(), ?op, "bulk assignment");
        rhs.assign_to(out, op);
    } else {
        rhs.assign_range(out, 0, op);
    }
}

/// Parallel assignment of `rhs` into `out`.
///
/// Falls back to [`assign`] unless the expression is parallelizable, large
/// enough, no serial section is active, and the backend is not serial.
///
/// # Panics
///
/// Panics in debug builds if `out.len() != rhs.size()`.
pub fn smp_assign<E: DenseVectorExpr>(out: &mut [E::Element], rhs: &E, op: AssignOp) {
    debug_assert_eq!(out.len(), rhs.size(), "invalid vector sizes");

    if E::USE_ASSIGN {
        trace!(size = out.len(), ?op, "bulk parallel assignment");
        rhs.smp_assign_to(out, op);
        return;
    }

    if E::SMP_ASSIGNABLE
        && !smp::is_serial_section_active()
        && rhs.can_smp_assign()
        && smp::backend() != SmpBackend::Serial
    {
        trace!(size = out.len(), ?op, "partitioned assignment");
        smp::partition(out, |chunk, offset| rhs.assign_range(chunk, offset, op));
    } else {
        rhs.assign_range(out, 0, op);
    }
}

/// Assigns `rhs` into a sparse target.
///
/// The result is materialized densely and converted back, dropping zeros.
pub fn assign_sparse<E: DenseVectorExpr>(
    out: &mut CompressedVector<E::Element, E::Transpose>,
    rhs: &E,
    op: AssignOp,
) {
    let mut dense = if op == AssignOp::Assign {
        DynamicVector::<E::Element, E::Transpose>::new(out.size())
    } else {
        out.to_dense()
    };
    smp_assign(dense.as_mut_slice(), rhs, op);
    *out = CompressedVector::from_dense(&dense);
}

/// Applies `op` with an all-zero right-hand side.
pub(crate) fn assign_zero<T: Numeric>(out: &mut [T], op: AssignOp) {
    if !op.is_identity_for_zero() {
        out.fill(T::zero());
    }
}

/// Kernel used for sparse row vector times dense matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MultKernel {
    /// One sparse dot product per result element. Column-major matrices.
    ColumnDot,
    /// One scaled row accumulation per vector nonzero. Row-major matrices.
    RowAxpy,
}

impl MultKernel {
    /// Kernel for a matrix operand stored in order `SO`.
    #[must_use]
    pub const fn select<SO: StorageOrder>() -> Self {
        if SO::IS_COLUMN_MAJOR {
            Self::ColumnDot
        } else {
            Self::RowAxpy
        }
    }
}

/// Range of nonzero positions of `x` that can meet column `column` of a
/// matrix with the given structure.
pub(crate) fn band<T: Numeric, TF: TransposeFlag>(
    x: &CompressedVector<T, TF>,
    structure: Structure,
    column: usize,
) -> (usize, usize) {
    match structure {
        Structure::Upper => (0, x.upper_bound(column)),
        Structure::StrictlyUpper => (0, x.lower_bound(column)),
        Structure::Lower => (x.lower_bound(column), x.non_zeros()),
        Structure::StrictlyLower => (x.upper_bound(column), x.non_zeros()),
        Structure::General | Structure::Symmetric => (0, x.non_zeros()),
    }
}

/// Columns of row `row` a matrix with the given structure can hold nonzeros
/// in, clipped to `lo..hi`.
fn row_band(structure: Structure, row: usize, lo: usize, hi: usize) -> (usize, usize) {
    match structure {
        Structure::Upper => (lo.max(row), hi),
        Structure::StrictlyUpper => (lo.max(row + 1), hi),
        Structure::Lower => (lo, hi.min(row + 1)),
        Structure::StrictlyLower => (lo, hi.min(row)),
        Structure::General | Structure::Symmetric => (lo, hi),
    }
}

/// Computes `out[k] op= (x * a)[offset + k]` for concrete operands.
///
/// `structure` is the triangle the matrix is known to have.
pub(crate) fn tsvec_dmat_kernel<T, TF, M>(
    out: &mut [T],
    x: &CompressedVector<T, TF>,
    a: &M,
    structure: Structure,
    offset: usize,
    op: AssignOp,
) where
    T: Numeric,
    TF: TransposeFlag,
    M: DenseMatrixExpr<Element = T> + ?Sized,
{
    match MultKernel::select::<M::Order>() {
        MultKernel::ColumnDot => column_dot(out, x, a, structure, offset, op),
        MultKernel::RowAxpy => match op {
            AssignOp::Assign => {
                out.fill(T::zero());
                row_axpy(out, x, a, structure, offset);
            }
            AssignOp::Add => row_axpy(out, x, a, structure, offset),
            AssignOp::Sub | AssignOp::Mult => {
                let mut tmp = vec![T::zero(); out.len()];
                row_axpy(&mut tmp, x, a, structure, offset);
                for (slot, value) in out.iter_mut().zip(tmp) {
                    op.apply(slot, value);
                }
            }
        },
    }
}

fn column_dot<T, TF, M>(
    out: &mut [T],
    x: &CompressedVector<T, TF>,
    a: &M,
    structure: Structure,
    offset: usize,
    op: AssignOp,
) where
    T: Numeric,
    TF: TransposeFlag,
    M: DenseMatrixExpr<Element = T> + ?Sized,
{
    for (k, slot) in out.iter_mut().enumerate() {
        let column = offset + k;
        let (begin, end) = band(x, structure, column);
        let mut sum = T::zero();
        if let Some(line) = a.line(column) {
            for pos in begin..end {
                sum += x.value_at(pos) * line[x.index_at(pos)];
            }
        } else {
            for pos in begin..end {
                sum += x.value_at(pos) * a.at(x.index_at(pos), column);
            }
        }
        op.apply(slot, sum);
    }
}

fn row_axpy<T, TF, M>(
    out: &mut [T],
    x: &CompressedVector<T, TF>,
    a: &M,
    structure: Structure,
    offset: usize,
) where
    T: Numeric,
    TF: TransposeFlag,
    M: DenseMatrixExpr<Element = T> + ?Sized,
{
    let hi = offset + out.len();
    for (row, value) in x.entries() {
        let (first, last) = row_band(structure, row, offset, hi);
        if first >= last {
            continue;
        }
        let target = &mut out[first - offset..last - offset];
        if let Some(line) = a.line(row) {
            T::axpy(target, value, &line[first..last]);
        } else {
            for (slot, column) in target.iter_mut().zip(first..last) {
                *slot += value * a.at(row, column);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense_matrix::DynamicMatrix;
    use lamina_core::{ColumnMajor, RowMajor, RowVector};

    fn vector() -> CompressedVector<i64, RowVector> {
        let mut x = CompressedVector::new(4);
        x.set(0, 1);
        x.set(2, 3);
        x.set(3, -2);
        x
    }

    fn rows() -> Vec<Vec<i64>> {
        vec![
            vec![1, 2, 3, 4],
            vec![0, 5, 6, 7],
            vec![0, 0, 8, 9],
            vec![0, 0, 0, 10],
        ]
    }

    fn expected(op_base: &[i64]) -> Vec<i64> {
        let m = rows();
        let x = [1, 0, 3, -2];
        (0..4)
            .map(|j| op_base[j] + (0..4).map(|i| x[i] * m[i][j]).sum::<i64>())
            .collect()
    }

    #[test]
    fn test_apply() {
        let mut v = 6;
        AssignOp::Add.apply(&mut v, 2);
        assert_eq!(v, 8);
        AssignOp::Sub.apply(&mut v, 3);
        assert_eq!(v, 5);
        AssignOp::Mult.apply(&mut v, 4);
        assert_eq!(v, 20);
        AssignOp::Assign.apply(&mut v, 1);
        assert_eq!(v, 1);
    }

    #[test]
    fn test_kernel_selection() {
        assert_eq!(MultKernel::select::<ColumnMajor>(), MultKernel::ColumnDot);
        assert_eq!(MultKernel::select::<RowMajor>(), MultKernel::RowAxpy);
    }

    #[test]
    fn test_kernels_agree() {
        let x = vector();
        let row_major = DynamicMatrix::<i64, RowMajor>::from_rows(rows());
        let col_major = DynamicMatrix::<i64, ColumnMajor>::from_rows(rows());
        let want = expected(&[0; 4]);

        for structure in [Structure::General, Structure::Upper] {
            let mut a = vec![7; 4];
            tsvec_dmat_kernel(&mut a, &x, &row_major, structure, 0, AssignOp::Assign);
            let mut b = vec![7; 4];
            tsvec_dmat_kernel(&mut b, &x, &col_major, structure, 0, AssignOp::Assign);
            assert_eq!(a, want);
            assert_eq!(b, want);
        }
    }

    #[test]
    fn test_kernel_offsets_and_ops() {
        let x = vector();
        let m = DynamicMatrix::<i64, RowMajor>::from_rows(rows());
        let full = expected(&[0; 4]);

        let mut tail = vec![1, 1];
        tsvec_dmat_kernel(&mut tail, &x, &m, Structure::Upper, 2, AssignOp::Add);
        assert_eq!(tail, vec![1 + full[2], 1 + full[3]]);

        let mut tail = vec![1, 1];
        tsvec_dmat_kernel(&mut tail, &x, &m, Structure::General, 2, AssignOp::Sub);
        assert_eq!(tail, vec![1 - full[2], 1 - full[3]]);

        let mut tail = vec![2, 3];
        tsvec_dmat_kernel(&mut tail, &x, &m, Structure::General, 2, AssignOp::Mult);
        assert_eq!(tail, vec![2 * full[2], 3 * full[3]]);
    }

    #[test]
    fn test_band_bounds() {
        let x = vector();
        assert_eq!(band(&x, Structure::Upper, 2), (0, 2));
        assert_eq!(band(&x, Structure::StrictlyUpper, 2), (0, 1));
        assert_eq!(band(&x, Structure::Lower, 2), (1, 3));
        assert_eq!(band(&x, Structure::StrictlyLower, 2), (2, 3));
        assert_eq!(band(&x, Structure::General, 2), (0, 3));
    }
}
