//! Random initialization for tests and benchmarks.
//!
//! Every helper takes the generator and the value distribution from the
//! caller, so seeded generators such as `ChaCha8Rng` reproduce the same
//! operands across runs.

use rand::distributions::Distribution;
use rand::seq::index;
use rand::Rng;

use lamina_core::{Numeric, StorageOrder, TransposeFlag};

use crate::dense_matrix::DynamicMatrix;
use crate::sparse_matrix::CompressedMatrix;
use crate::sparse_vector::CompressedVector;
use crate::symmetric::SymmetricMatrix;

/// Overwrites every element of `m`, walking the storage in memory order.
pub fn randomize_dense<T, SO, R, D>(m: &mut DynamicMatrix<T, SO>, rng: &mut R, dist: &D)
where
    T: Numeric,
    SO: StorageOrder,
    R: Rng + ?Sized,
    D: Distribution<T>,
{
    for slot in m.as_mut_slice() {
        *slot = dist.sample(rng);
    }
}

/// A vector of `size` elements with `nonzeros` stored ones at random
/// indices.
///
/// # Panics
///
/// Panics if `nonzeros > size`.
pub fn random_sparse_vector<T, TF, R, D>(
    size: usize,
    nonzeros: usize,
    rng: &mut R,
    dist: &D,
) -> CompressedVector<T, TF>
where
    T: Numeric,
    TF: TransposeFlag,
    R: Rng + ?Sized,
    D: Distribution<T>,
{
    assert!(nonzeros <= size, "invalid number of non-zero elements");
    let mut positions = index::sample(rng, size, nonzeros).into_vec();
    positions.sort_unstable();

    let mut v = CompressedVector::with_capacity(size, nonzeros);
    for i in positions {
        v.append(i, dist.sample(rng), false);
    }
    v
}

/// Maps `k` to the `k`-th position of the upper triangle of an `n x n`
/// matrix, diagonal included, in row order.
fn upper_position(mut k: usize, n: usize) -> (usize, usize) {
    let mut row = 0;
    while k >= n - row {
        k -= n - row;
        row += 1;
    }
    (row, row + k)
}

/// An `n x n` symmetric matrix with `nonzeros` random elements in its upper
/// triangle, each mirrored below the diagonal.
///
/// # Panics
///
/// Panics if `nonzeros` exceeds the size of the upper triangle.
pub fn random_symmetric<T, SO, R, D>(
    n: usize,
    nonzeros: usize,
    rng: &mut R,
    dist: &D,
) -> SymmetricMatrix<CompressedMatrix<T, SO>>
where
    T: Numeric,
    SO: StorageOrder,
    R: Rng + ?Sized,
    D: Distribution<T>,
{
    let triangle = n * (n + 1) / 2;
    assert!(nonzeros <= triangle, "invalid number of non-zero elements");

    let mut s = SymmetricMatrix::with_capacity(n, 2 * nonzeros);
    for k in index::sample(rng, triangle, nonzeros).into_vec() {
        let (i, j) = upper_position(k, n);
        s.set(i, j, dist.sample(rng));
    }
    s
}
