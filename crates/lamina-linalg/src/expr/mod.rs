//! Lazy expression nodes.
//!
//! Building an expression computes nothing; the nodes only record their
//! operands. Values are produced when an expression is assigned to a
//! container (see [`dispatch`](crate::dispatch)) or when a single element is
//! requested through [`DenseVectorExpr::at`](crate::DenseVectorExpr::at).
//!
//! ## Node Types
//!
//! ```text
//! SVecDMatMultExpr   x * A, sparse row vector times dense matrix
//! DMatTransExpr      trans(A)
//! MatMatMultExpr     A * B
//! SVecScalarMultExpr x * s
//! Declared           A with an unchecked structure declaration
//! Serial             expression that never assigns in parallel
//! ```

mod declared;
mod dmat_trans;
mod mat_mat_mult;
mod ops;
mod serial;
mod svec_dmat_mult;
mod svec_scalar_mult;

pub use declared::{
    declare_lower, declare_strictly_lower, declare_strictly_upper, declare_symmetric,
    declare_upper, Declared,
};
pub use dmat_trans::{trans, DMatTransExpr};
pub use mat_mat_mult::{mat_mat_mult, MatMatMultExpr};
pub use ops::{multiply, TVecMultRhs};
pub use serial::{serial, Serial};
pub use svec_dmat_mult::{MultResult, MultTranspose, SVecDMatMultExpr};
pub use svec_scalar_mult::{scaled, SVecScalarMultExpr};
