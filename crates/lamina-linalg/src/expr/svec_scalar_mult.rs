//! Sparse vector times scalar.

use std::borrow::Cow;

use crate::dispatch::EvalMode;
use crate::sparse_vector::CompressedVector;
use crate::traits::{Operand, SparseVectorExpr, VectorExpr};

/// Expression node for `x * s`.
#[derive(Debug, Clone)]
pub struct SVecScalarMultExpr<V: SparseVectorExpr> {
    vec: V,
    scalar: V::Element,
}

impl<V: SparseVectorExpr> SVecScalarMultExpr<V> {
    /// Creates the node.
    pub fn new(vec: V, scalar: V::Element) -> Self {
        Self { vec, scalar }
    }

    /// Returns the vector operand.
    pub fn left_operand(&self) -> &V {
        &self.vec
    }

    /// Returns the scalar.
    pub fn right_operand(&self) -> V::Element {
        self.scalar
    }
}

/// Scales `vec` by `scalar` lazily.
pub fn scaled<V: SparseVectorExpr>(vec: V, scalar: V::Element) -> SVecScalarMultExpr<V> {
    SVecScalarMultExpr::new(vec, scalar)
}

impl<V: SparseVectorExpr> Operand for SVecScalarMultExpr<V> {
    const IS_COMPUTATION: bool = true;
    const SMP_ASSIGNABLE: bool = V::SMP_ASSIGNABLE;

    fn is_aliased(&self, alias: *const ()) -> bool {
        self.vec.is_aliased(alias)
    }

    fn can_alias(&self, alias: *const ()) -> bool {
        self.vec.can_alias(alias)
    }
}

impl<V: SparseVectorExpr> VectorExpr for SVecScalarMultExpr<V> {
    type Element = V::Element;
    type Transpose = V::Transpose;

    fn size(&self) -> usize {
        self.vec.size()
    }
}

impl<V: SparseVectorExpr> SparseVectorExpr for SVecScalarMultExpr<V> {
    fn non_zeros(&self) -> usize {
        self.vec.non_zeros()
    }

    fn evaluate(&self, mode: EvalMode) -> Cow<'_, CompressedVector<V::Element, V::Transpose>> {
        Cow::Owned(self.vec.evaluate(mode).scaled(self.scalar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::RowVector;

    #[test]
    fn test_evaluate() {
        let mut x = CompressedVector::<i32, RowVector>::new(5);
        x.set(1, 3);
        x.set(4, -2);
        let e = scaled(&x, 4);
        assert_eq!(e.size(), 5);
        assert_eq!(e.non_zeros(), 2);
        let v = e.evaluate(EvalMode::Serial);
        assert_eq!(v.entries().collect::<Vec<_>>(), vec![(1, 12), (4, -8)]);
        assert!(e.is_aliased(crate::traits::address_of(&x)));
    }
}
