//! Forced serial evaluation.

use crate::dispatch::AssignOp;
use crate::traits::{DenseVectorExpr, Operand, VectorExpr};

/// Wrapper that keeps an expression out of parallel assignment.
#[derive(Debug, Clone)]
pub struct Serial<E> {
    expr: E,
}

/// Marks `expr` for serial evaluation.
pub fn serial<E: DenseVectorExpr>(expr: E) -> Serial<E> {
    Serial { expr }
}

impl<E: DenseVectorExpr> Serial<E> {
    /// Returns the wrapped expression.
    pub fn operand(&self) -> &E {
        &self.expr
    }
}

impl<E: DenseVectorExpr> Operand for Serial<E> {
    const IS_COMPUTATION: bool = E::IS_COMPUTATION;
    const REQUIRES_EVALUATION: bool = E::REQUIRES_EVALUATION;
    const SMP_ASSIGNABLE: bool = false;
    const VECTORIZABLE: bool = E::VECTORIZABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        self.expr.is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        self.expr.can_alias(alias)
    }

    fn is_aligned(&self) -> bool {
        self.expr.is_aligned()
    }
}

impl<E: DenseVectorExpr> VectorExpr for Serial<E> {
    type Element = E::Element;
    type Transpose = E::Transpose;

    fn size(&self) -> usize {
        self.expr.size()
    }
}

impl<E: DenseVectorExpr> DenseVectorExpr for Serial<E> {
    const USE_ASSIGN: bool = E::USE_ASSIGN;

    fn at(&self, index: usize) -> E::Element {
        self.expr.at(index)
    }

    fn assign_range(&self, out: &mut [E::Element], offset: usize, op: AssignOp) {
        self.expr.assign_range(out, offset, op);
    }

    fn assign_to(&self, out: &mut [E::Element], op: AssignOp) {
        self.expr.assign_to(out, op);
    }

    fn smp_assign_to(&self, out: &mut [E::Element], op: AssignOp) {
        self.expr.assign_to(out, op);
    }
}
