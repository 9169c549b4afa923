//! # lamina-core
//!
//! Foundations shared by every lamina crate.
//!
//! This crate provides:
//! - The element trait `Numeric` with slice kernels
//! - Storage-order, transpose and structure tags for compile-time dispatch
//! - The workspace error type
//! - Runtime configuration of the parallel backend
//! - SIMD load/store primitives with a scalar fallback
//!
//! ## Tag Hierarchy
//!
//! ```text
//! StorageOrder    RowMajor | ColumnMajor
//! TransposeFlag   RowVector | ColumnVector
//! Structure       General | Symmetric | Lower | Upper | StrictlyLower | StrictlyUpper
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod simd;
pub mod structure;
pub mod traits;

pub use config::{set_smp_config, smp_config, SmpBackend, SmpConfig};
pub use error::{Error, Result};
pub use structure::{
    ColumnMajor, ColumnVector, LowerTag, RowMajor, RowVector, StorageOrder, StrictlyLowerTag,
    StrictlyUpperTag, Structure, StructureTag, SymmetricTag, TransposeFlag, UpperTag,
};
pub use traits::Numeric;
