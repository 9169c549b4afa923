//! # lamina-linalg
//!
//! Expression-template linear algebra for lamina.
//!
//! This crate provides:
//! - Dense and compressed vectors and matrices in either storage order
//! - Capability traits describing operands of the expression graph
//! - Lazy expression nodes, led by sparse row vector times dense matrix
//! - An assignment dispatcher choosing serial, bulk or parallel evaluation
//! - A symmetric matrix adaptor that keeps `A(i,j) == A(j,i)` on every write
//! - Random initialization helpers for tests and benchmarks
//!
//! ## Evaluation Strategy
//!
//! Building `&x * &a` computes nothing. Assigning the node to a vector picks
//! one of three paths:
//! - Element-wise: operands are plain containers, each result element is a
//!   sparse dot product
//! - Bulk: an operand is itself a computation, so it is evaluated into a
//!   temporary first and a whole-vector kernel runs
//! - Parallel: the result is large enough, so the target is split into
//!   chunks assigned on the configured backend
//!
//! ```
//! use lamina_linalg::prelude::*;
//!
//! let mut x = CompressedVector::<f64, RowVector>::new(3);
//! x.set(0, 1.0);
//! x.set(2, 2.0);
//! let a = DynamicMatrix::<f64, ColumnMajor>::from_rows(vec![
//!     vec![1.0, 2.0],
//!     vec![3.0, 4.0],
//!     vec![5.0, 6.0],
//! ]);
//! let y = DynamicVector::from_expr(&(&x * &a));
//! assert_eq!(y.as_slice(), &[11.0, 14.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dense_matrix;
pub mod dense_vector;
pub mod dispatch;
pub mod expr;
pub mod random;
pub mod smp;
pub mod sparse_matrix;
pub mod sparse_vector;
pub mod storage;
pub mod symmetric;
pub mod traits;

pub use dense_matrix::DynamicMatrix;
pub use dense_vector::DynamicVector;
pub use dispatch::{AssignOp, EvalMode};
pub use expr::{
    declare_lower, declare_strictly_lower, declare_strictly_upper, declare_symmetric,
    declare_upper, mat_mat_mult, multiply, scaled, serial, trans, Declared, DMatTransExpr,
    MatMatMultExpr, MultResult, MultTranspose, SVecDMatMultExpr, SVecScalarMultExpr, Serial,
    TVecMultRhs,
};
pub use lamina_core::{
    ColumnMajor, ColumnVector, Error, Numeric, Result, RowMajor, RowVector, StorageOrder,
    Structure, TransposeFlag,
};
pub use sparse_matrix::CompressedMatrix;
pub use sparse_vector::CompressedVector;
pub use storage::{MatrixStorage, SparseStorage};
pub use symmetric::SymmetricMatrix;
pub use traits::{
    DenseMatrixExpr, DenseVectorExpr, MatrixExpr, Operand, SparseVectorExpr, VectorExpr,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dense_matrix::DynamicMatrix;
    pub use crate::dense_vector::DynamicVector;
    pub use crate::expr::{multiply, scaled, serial, trans};
    pub use crate::sparse_matrix::CompressedMatrix;
    pub use crate::sparse_vector::CompressedVector;
    pub use crate::storage::{MatrixStorage, SparseStorage};
    pub use crate::symmetric::SymmetricMatrix;
    pub use crate::traits::{
        DenseMatrixExpr, DenseVectorExpr, MatrixExpr, Operand, SparseVectorExpr, VectorExpr,
    };
    pub use lamina_core::{
        ColumnMajor, ColumnVector, Numeric, RowMajor, RowVector, StorageOrder, TransposeFlag,
    };
}

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;
