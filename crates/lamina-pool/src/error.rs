//! Pool errors.

use std::io;

use thiserror::Error;

/// Errors raised while creating or resizing a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool must keep at least one thread.
    #[error("invalid number of threads")]
    InvalidThreadCount,

    /// The operating system refused to start a worker.
    #[error("failed to spawn worker thread")]
    Spawn(#[from] io::Error),
}

impl PartialEq for PoolError {
    /// Spawn failures compare by [`io::ErrorKind`].
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidThreadCount, Self::InvalidThreadCount) => true,
            (Self::Spawn(a), Self::Spawn(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl Eq for PoolError {}
