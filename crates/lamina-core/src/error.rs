//! Error type shared by the lamina crates.

use std::sync::Arc;

use lamina_pool::PoolError;
use thiserror::Error;

/// Errors raised by container, expression and adaptor operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Operand dimensions are incompatible.
    #[error("sizes do not match: expected {expected}, found {found}")]
    SizeMismatch {
        /// Size required by the operation.
        expected: usize,
        /// Size supplied by the operand.
        found: usize,
    },

    /// A symmetric matrix was constructed from a non-symmetric source.
    #[error("invalid setup of symmetric matrix")]
    InvalidSetup,

    /// An assignment would violate the symmetry of the target.
    #[error("invalid assignment to symmetric matrix")]
    InvalidAssignment,

    /// An insertion hit an element that is already stored.
    #[error("duplicate element at ({row}, {column})")]
    DuplicateElement {
        /// Row of the existing element.
        row: usize,
        /// Column of the existing element.
        column: usize,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {variable}")]
    InvalidConfig {
        /// Name of the environment variable.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A thread count of zero was requested.
    #[error("invalid number of threads")]
    InvalidThreadCount,

    /// The parallel backend could not be set up.
    #[error("thread pool failure")]
    ThreadPool(#[source] Arc<PoolError>),
}

impl From<PoolError> for Error {
    fn from(err: PoolError) -> Self {
        Self::ThreadPool(Arc::new(err))
    }
}

/// Result alias used throughout lamina.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::SizeMismatch {
            expected: 3,
            found: 4,
        };
        assert_eq!(err.to_string(), "sizes do not match: expected 3, found 4");
        assert_eq!(
            Error::DuplicateElement { row: 1, column: 2 }.to_string(),
            "duplicate element at (1, 2)"
        );
        assert_eq!(
            Error::InvalidAssignment.to_string(),
            "invalid assignment to symmetric matrix"
        );
    }

    #[test]
    fn test_pool_error_is_kept_as_source() {
        let err = Error::from(PoolError::InvalidThreadCount);
        assert_eq!(err, Error::ThreadPool(Arc::new(PoolError::InvalidThreadCount)));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("invalid number of threads"));
    }
}
