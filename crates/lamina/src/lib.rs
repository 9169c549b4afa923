//! # Lamina
//!
//! Expression-template linear algebra in Rust.
//!
//! Lamina builds arithmetic on vectors and matrices as lazy expression trees
//! and picks the evaluation strategy when a tree is assigned: element-wise,
//! through a bulk kernel, or split across worker threads.
//!
//! ## Features
//!
//! - **Sparse Row Vector × Dense Matrix**: band-limited kernels for declared
//!   triangular operands
//! - **Symmetric Adaptor**: sparse or dense storage kept symmetric on every
//!   write
//! - **Parallel Assignment**: a resizable thread pool or rayon, selected at
//!   runtime
//! - **SIMD Stores**: aligned and unaligned stores for SSE2, AVX and AVX-512
//!
//! ## Quick Start
//!
//! ```rust
//! use lamina::prelude::*;
//!
//! let mut x = CompressedVector::<f64, RowVector>::new(2);
//! x.set(1, 2.0);
//! let a = DynamicMatrix::<f64, ColumnMajor>::identity(2);
//! let y = (&x * &a).eval();
//! assert_eq!(y.as_slice(), &[0.0, 2.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use lamina_core as core;
pub use lamina_linalg as linalg;
pub use lamina_pool as pool;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use lamina_core::{Error, Result};
    pub use lamina_linalg::prelude::*;
    pub use lamina_linalg::{declare_symmetric, declare_upper, mat_mat_mult};
    pub use lamina_pool::ThreadPool;
}
