//! Capability traits of the expression graph.
//!
//! Every operand, whether a container or a lazy expression, describes itself
//! through these traits. Associated constants carry the compile-time flags the
//! dispatcher and the expression nodes branch on; methods answer the runtime
//! questions (aliasing, alignment, whether parallel assignment pays off).
//!
//! References implement the traits of their referent. An expression node
//! therefore stores a container operand as `&Container` and a nested
//! expression by value.

use std::borrow::Cow;

use lamina_core::{Numeric, StorageOrder, Structure, TransposeFlag};

use crate::dense_matrix::DynamicMatrix;
use crate::dense_vector::DynamicVector;
use crate::dispatch::{AssignOp, EvalMode};
use crate::sparse_vector::CompressedVector;

/// Returns the address of `value` for alias queries.
#[inline]
#[must_use]
pub fn address_of<T: ?Sized>(value: &T) -> *const () {
    (value as *const T).cast()
}

/// Properties shared by every operand.
pub trait Operand: Sync {
    /// The operand computes its value from other operands.
    const IS_COMPUTATION: bool = false;

    /// The operand must be evaluated into a temporary before it is read.
    const REQUIRES_EVALUATION: bool = false;

    /// The operand may take part in a partitioned parallel assignment.
    const SMP_ASSIGNABLE: bool = false;

    /// Element access can use the SIMD kernels.
    const VECTORIZABLE: bool = false;

    /// Returns true if the operand is the object at `alias`.
    fn is_aliased(&self, alias: *const ()) -> bool;

    /// Returns true if the operand might refer to the object at `alias`.
    fn can_alias(&self, alias: *const ()) -> bool {
        self.is_aliased(alias)
    }

    /// Returns true if the operand's data is aligned for aligned SIMD stores.
    fn is_aligned(&self) -> bool {
        false
    }

    /// Returns true if a parallel assignment of this operand pays off.
    fn can_smp_assign(&self) -> bool {
        false
    }
}

impl<O: Operand + ?Sized> Operand for &O {
    const IS_COMPUTATION: bool = O::IS_COMPUTATION;
    const REQUIRES_EVALUATION: bool = O::REQUIRES_EVALUATION;
    const SMP_ASSIGNABLE: bool = O::SMP_ASSIGNABLE;
    const VECTORIZABLE: bool = O::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        (**self).is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        (**self).can_alias(alias)
    }

    fn is_aligned(&self) -> bool {
        (**self).is_aligned()
    }

    fn can_smp_assign(&self) -> bool {
        (**self).can_smp_assign()
    }
}

/// A vector operand.
pub trait VectorExpr: Operand {
    /// Element type.
    type Element: Numeric;

    /// Orientation.
    type Transpose: TransposeFlag;

    /// Number of elements.
    fn size(&self) -> usize;
}

impl<V: VectorExpr + ?Sized> VectorExpr for &V {
    type Element = V::Element;
    type Transpose = V::Transpose;

    fn size(&self) -> usize {
        (**self).size()
    }
}

/// Concrete sparse vector matching the operand `V`.
pub type SparseOf<V> = CompressedVector<<V as VectorExpr>::Element, <V as VectorExpr>::Transpose>;

/// A sparse vector operand.
pub trait SparseVectorExpr: VectorExpr {
    /// Number of stored elements.
    fn non_zeros(&self) -> usize;

    /// Returns the operand as a concrete vector.
    ///
    /// Containers borrow themselves; computations evaluate into an owned
    /// temporary. `mode` decides whether nested evaluation may run in
    /// parallel.
    fn evaluate(&self, mode: EvalMode) -> Cow<'_, SparseOf<Self>>;
}

impl<V: SparseVectorExpr + ?Sized> SparseVectorExpr for &V {
    fn non_zeros(&self) -> usize {
        (**self).non_zeros()
    }

    fn evaluate(&self, mode: EvalMode) -> Cow<'_, SparseOf<Self>> {
        (**self).evaluate(mode)
    }
}

/// A dense vector operand.
///
/// The assignment hooks default to element-wise evaluation through
/// [`DenseVectorExpr::at`]. Expressions with a faster whole-vector kernel
/// override them and set [`USE_ASSIGN`](Self::USE_ASSIGN) when the
/// dispatcher must route through [`assign_to`](Self::assign_to).
pub trait DenseVectorExpr: VectorExpr {
    /// Assignment must go through the bulk hooks instead of element access.
    const USE_ASSIGN: bool = false;

    /// Computes the element at `index`.
    fn at(&self, index: usize) -> Self::Element;

    /// Applies `op` with elements `offset..offset + out.len()` to `out`.
    fn assign_range(&self, out: &mut [Self::Element], offset: usize, op: AssignOp) {
        for (k, slot) in out.iter_mut().enumerate() {
            op.apply(slot, self.at(offset + k));
        }
    }

    /// Serial whole-vector assignment.
    fn assign_to(&self, out: &mut [Self::Element], op: AssignOp) {
        self.assign_range(out, 0, op);
    }

    /// Parallel whole-vector assignment. Only called when
    /// [`USE_ASSIGN`](Self::USE_ASSIGN) is set.
    fn smp_assign_to(&self, out: &mut [Self::Element], op: AssignOp) {
        self.assign_to(out, op);
    }

    /// Evaluates the operand into a new vector.
    fn eval(&self) -> DynamicVector<Self::Element, Self::Transpose>
    where
        Self: Sized,
    {
        DynamicVector::from_expr(self)
    }
}

impl<E: DenseVectorExpr + ?Sized> DenseVectorExpr for &E {
    const USE_ASSIGN: bool = E::USE_ASSIGN;

    fn at(&self, index: usize) -> Self::Element {
        (**self).at(index)
    }

    fn assign_range(&self, out: &mut [Self::Element], offset: usize, op: AssignOp) {
        (**self).assign_range(out, offset, op);
    }

    fn assign_to(&self, out: &mut [Self::Element], op: AssignOp) {
        (**self).assign_to(out, op);
    }

    fn smp_assign_to(&self, out: &mut [Self::Element], op: AssignOp) {
        (**self).smp_assign_to(out, op);
    }
}

/// A matrix operand.
pub trait MatrixExpr: Operand {
    /// Element type.
    type Element: Numeric;

    /// Storage order of the operand or of its evaluated form.
    type Order: StorageOrder;

    /// Structure known at compile time.
    const STRUCTURE: Structure = Structure::General;

    /// Number of rows.
    fn rows(&self) -> usize;

    /// Number of columns.
    fn columns(&self) -> usize;

    /// Computes the element at `(row, column)`.
    fn at(&self, row: usize, column: usize) -> Self::Element;

    /// Visits every non-default element.
    fn for_each_non_zero<F>(&self, mut f: F)
    where
        F: FnMut(usize, usize, Self::Element),
    {
        for row in 0..self.rows() {
            for column in 0..self.columns() {
                let value = self.at(row, column);
                if !value.is_default() {
                    f(row, column, value);
                }
            }
        }
    }
}

impl<M: MatrixExpr + ?Sized> MatrixExpr for &M {
    type Element = M::Element;
    type Order = M::Order;
    const STRUCTURE: Structure = M::STRUCTURE;

    fn rows(&self) -> usize {
        (**self).rows()
    }

    fn columns(&self) -> usize {
        (**self).columns()
    }

    fn at(&self, row: usize, column: usize) -> Self::Element {
        (**self).at(row, column)
    }

    fn for_each_non_zero<F>(&self, f: F)
    where
        F: FnMut(usize, usize, Self::Element),
    {
        (**self).for_each_non_zero(f);
    }
}

/// A dense matrix operand.
pub trait DenseMatrixExpr: MatrixExpr {
    /// Contiguous storage of line `index` (a row for row-major operands, a
    /// column for column-major ones), if the operand has one.
    fn line(&self, index: usize) -> Option<&[Self::Element]> {
        let _ = index;
        None
    }

    /// Returns the operand as a concrete matrix.
    ///
    /// Containers borrow themselves; everything else evaluates into an owned
    /// temporary.
    fn evaluate(&self, mode: EvalMode) -> Cow<'_, DynamicMatrix<Self::Element, Self::Order>>;
}

impl<M: DenseMatrixExpr + ?Sized> DenseMatrixExpr for &M {
    fn line(&self, index: usize) -> Option<&[Self::Element]> {
        (**self).line(index)
    }

    fn evaluate(&self, mode: EvalMode) -> Cow<'_, DynamicMatrix<Self::Element, Self::Order>> {
        (**self).evaluate(mode)
    }
}
