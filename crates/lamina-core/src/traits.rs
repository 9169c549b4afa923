//! Element traits.
//!
//! Every container and expression in lamina is generic over an element type
//! implementing [`Numeric`]. Besides the arithmetic the kernels need, the trait
//! carries slice kernels that vectorizable types route through [`crate::simd`].

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use num_traits::{One, Zero};

use crate::simd;

/// A numeric element type.
///
/// # Laws
///
/// - `zero()` is the default value; sparse containers never need to store it
/// - Addition and multiplication behave like the primitive operations
pub trait Numeric:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Whether slices of this type use the SIMD kernels.
    const VECTORIZABLE: bool = false;

    /// Returns true if this is the default (zero) value.
    #[inline]
    fn is_default(&self) -> bool {
        self.is_zero()
    }

    /// Copies `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[inline]
    fn copy(dst: &mut [Self], src: &[Self]) {
        dst.copy_from_slice(src);
    }

    /// Computes `y[i] += alpha * x[i]`.
    #[inline]
    fn axpy(y: &mut [Self], alpha: Self, x: &[Self]) {
        assert_eq!(y.len(), x.len(), "axpy operands differ in length");
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi += alpha * xi;
        }
    }

    /// Computes the sum of `a[i] * b[i]`.
    #[inline]
    fn dot(a: &[Self], b: &[Self]) -> Self {
        assert_eq!(a.len(), b.len(), "dot operands differ in length");
        a.iter()
            .zip(b)
            .fold(Self::zero(), |acc, (&ai, &bi)| acc + ai * bi)
    }
}

macro_rules! impl_numeric_scalar {
    ($($t:ty),*) => {
        $(impl Numeric for $t {})*
    };
}

macro_rules! impl_numeric_simd_int {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                const VECTORIZABLE: bool = true;

                #[inline]
                fn copy(dst: &mut [Self], src: &[Self]) {
                    simd::copy(dst, src);
                }
            }
        )*
    };
}

macro_rules! impl_numeric_simd_float {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                const VECTORIZABLE: bool = true;

                #[inline]
                fn copy(dst: &mut [Self], src: &[Self]) {
                    simd::copy(dst, src);
                }

                #[inline]
                fn axpy(y: &mut [Self], alpha: Self, x: &[Self]) {
                    simd::axpy(y, alpha, x);
                }

                #[inline]
                fn dot(a: &[Self], b: &[Self]) -> Self {
                    simd::dot(a, b)
                }
            }
        )*
    };
}

impl_numeric_scalar!(i8, u8, isize, usize);
impl_numeric_simd_int!(i16, u16, i32, u32, i64, u64);
impl_numeric_simd_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_default() {
        assert!(0i32.is_default());
        assert!(0.0f64.is_default());
        assert!(!1u8.is_default());
        assert!(!(-2.5f32).is_default());
    }

    #[test]
    fn test_vectorizable_flags() {
        assert!(f64::VECTORIZABLE);
        assert!(i32::VECTORIZABLE);
        assert!(u16::VECTORIZABLE);
        assert!(!u8::VECTORIZABLE);
        assert!(!isize::VECTORIZABLE);
    }

    #[test]
    fn test_scalar_kernels() {
        let mut y = [1u8, 2, 3];
        u8::axpy(&mut y, 2, &[1, 1, 1]);
        assert_eq!(y, [3, 4, 5]);
        assert_eq!(u8::dot(&[1, 2, 3], &[4, 5, 6]), 32);
    }

    #[test]
    fn test_vectorized_kernels_match_scalar() {
        let x: Vec<f64> = (0..37).map(f64::from).collect();
        let mut y = vec![1.0; 37];
        f64::axpy(&mut y, 0.5, &x);
        for (i, value) in y.iter().enumerate() {
            assert!((value - (1.0 + 0.5 * i as f64)).abs() < 1e-12);
        }

        let expected: f64 = x.iter().map(|v| v * v).sum();
        assert!((f64::dot(&x, &x) - expected).abs() < 1e-9);

        let mut copied = vec![0i64; 19];
        let src: Vec<i64> = (0..19).collect();
        i64::copy(&mut copied, &src);
        assert_eq!(copied, src);
    }
}
