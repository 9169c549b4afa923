//! SIMD load/store primitives.
//!
//! Register width is chosen at compile time from the enabled target features:
//!
//! | tier      | floats  | 32/64-bit ints | 16-bit ints |
//! |-----------|---------|----------------|-------------|
//! | `avx512f` | 512 bit | 512 bit        | 256 bit     |
//! | `avx2`    | 256 bit | 256 bit        | 256 bit     |
//! | `avx`     | 256 bit | 128 bit        | 128 bit     |
//! | `sse2`    | 128 bit | 128 bit        | 128 bit     |
//! | other     | scalar  | scalar         | scalar      |
//!
//! On targets without a vector tier every register holds a single element and
//! the primitives degrade to plain loads and stores.
//!
//! The slice kernels ([`copy`], [`axpy`], [`dot`]) peel leading elements until
//! the destination is aligned, run full registers with aligned stores, and
//! finish the tail with scalar code.

use std::ops::{Add, AddAssign, Mul};

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
mod x86;

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
mod scalar;

/// Instruction set tier selected at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimdTier {
    /// No vector registers.
    Scalar,
    /// 128-bit SSE2 registers.
    Sse2,
    /// 256-bit float registers, 128-bit integer registers.
    Avx,
    /// 256-bit float and integer registers.
    Avx2,
    /// 512-bit registers; also used for many-core targets.
    Avx512,
}

/// The tier this crate was compiled for.
pub const TIER: SimdTier = if cfg!(all(target_arch = "x86_64", target_feature = "avx512f")) {
    SimdTier::Avx512
} else if cfg!(all(target_arch = "x86_64", target_feature = "avx2")) {
    SimdTier::Avx2
} else if cfg!(all(target_arch = "x86_64", target_feature = "avx")) {
    SimdTier::Avx
} else if cfg!(all(target_arch = "x86_64", target_feature = "sse2")) {
    SimdTier::Sse2
} else {
    SimdTier::Scalar
};

/// Width in bytes of the widest float register of [`TIER`].
pub const REGISTER_BYTES: usize = match TIER {
    SimdTier::Avx512 => 64,
    SimdTier::Avx | SimdTier::Avx2 => 32,
    SimdTier::Sse2 => 16,
    SimdTier::Scalar => 8,
};

/// An element type with a vector register representation.
///
/// Implemented for 2, 4 and 8 byte integers and for `f32`/`f64`.
pub trait SimdElement: Copy + 'static {
    /// Register holding [`LANES`](Self::LANES) elements.
    type Register: Copy;

    /// Elements per register.
    const LANES: usize;

    /// Required alignment in bytes for aligned loads and stores.
    const ALIGNMENT: usize;

    /// Loads a register from an aligned address.
    ///
    /// # Safety
    ///
    /// `src` must be valid for `LANES` reads and aligned to `ALIGNMENT`.
    unsafe fn load_aligned(src: *const Self) -> Self::Register;

    /// Loads a register from any address.
    ///
    /// # Safety
    ///
    /// `src` must be valid for `LANES` reads.
    unsafe fn load_unaligned(src: *const Self) -> Self::Register;

    /// Stores a register to an aligned address.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for `LANES` writes and aligned to `ALIGNMENT`.
    unsafe fn store_aligned(dst: *mut Self, value: Self::Register);

    /// Stores a register to any address.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for `LANES` writes.
    unsafe fn store_unaligned(dst: *mut Self, value: Self::Register);

    /// Broadcasts `value` to every lane.
    fn splat(value: Self) -> Self::Register;
}

/// Floating point registers with lane-wise arithmetic.
pub trait SimdFloat: SimdElement + Default + Add<Output = Self> + Mul<Output = Self> + AddAssign {
    /// Lane-wise sum.
    fn add(a: Self::Register, b: Self::Register) -> Self::Register;

    /// Lane-wise product.
    fn mul(a: Self::Register, b: Self::Register) -> Self::Register;

    /// Sum of all lanes.
    fn reduce_sum(value: Self::Register) -> Self;
}

/// Returns true if `ptr` satisfies the aligned store requirement of `T`.
#[inline]
#[must_use]
pub fn is_aligned_for<T: SimdElement>(ptr: *const T) -> bool {
    (ptr as usize) % T::ALIGNMENT == 0
}

/// Broadcasts `value` to every lane of a register.
#[inline]
#[must_use]
pub fn splat<T: SimdElement>(value: T) -> T::Register {
    T::splat(value)
}

/// Aligned store of a full register to the front of `dst`.
///
/// # Panics
///
/// Panics if `dst` is shorter than one register or is not aligned to
/// `T::ALIGNMENT`.
#[inline]
pub fn store<T: SimdElement>(dst: &mut [T], value: T::Register) {
    assert!(dst.len() >= T::LANES, "store target shorter than one register");
    assert!(is_aligned_for(dst.as_ptr()), "misaligned SIMD store");
    // SAFETY: length and alignment checked above.
    unsafe { T::store_aligned(dst.as_mut_ptr(), value) }
}

/// Unaligned store of a full register to the front of `dst`.
///
/// # Panics
///
/// Panics if `dst` is shorter than one register.
#[inline]
pub fn storeu<T: SimdElement>(dst: &mut [T], value: T::Register) {
    assert!(dst.len() >= T::LANES, "store target shorter than one register");
    // SAFETY: length checked above.
    unsafe { T::store_unaligned(dst.as_mut_ptr(), value) }
}

/// Aligned load of a full register from the front of `src`.
///
/// # Panics
///
/// Panics if `src` is shorter than one register or is not aligned.
#[inline]
#[must_use]
pub fn load<T: SimdElement>(src: &[T]) -> T::Register {
    assert!(src.len() >= T::LANES, "load source shorter than one register");
    assert!(is_aligned_for(src.as_ptr()), "misaligned SIMD load");
    // SAFETY: length and alignment checked above.
    unsafe { T::load_aligned(src.as_ptr()) }
}

/// Unaligned load of a full register from the front of `src`.
///
/// # Panics
///
/// Panics if `src` is shorter than one register.
#[inline]
#[must_use]
pub fn loadu<T: SimdElement>(src: &[T]) -> T::Register {
    assert!(src.len() >= T::LANES, "load source shorter than one register");
    // SAFETY: length checked above.
    unsafe { T::load_unaligned(src.as_ptr()) }
}

/// Number of leading elements to process before `ptr + head` is aligned.
#[inline]
fn head_len<T: SimdElement>(ptr: *const T, len: usize) -> usize {
    let offset = ptr.align_offset(T::ALIGNMENT);
    offset.min(len)
}

/// Copies `src` into `dst` with aligned stores.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn copy<T: SimdElement>(dst: &mut [T], src: &[T]) {
    assert_eq!(dst.len(), src.len(), "copy operands differ in length");
    let len = dst.len();
    let head = head_len(dst.as_ptr(), len);
    dst[..head].copy_from_slice(&src[..head]);

    let mut i = head;
    while i + T::LANES <= len {
        // SAFETY: `i + LANES <= len` for both slices and `dst + i` is aligned
        // because `head` advanced it to the alignment boundary.
        unsafe {
            let value = T::load_unaligned(src.as_ptr().add(i));
            T::store_aligned(dst.as_mut_ptr().add(i), value);
        }
        i += T::LANES;
    }
    dst[i..].copy_from_slice(&src[i..]);
}

/// Computes `y[i] += alpha * x[i]`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn axpy<T: SimdFloat>(y: &mut [T], alpha: T, x: &[T]) {
    assert_eq!(y.len(), x.len(), "axpy operands differ in length");
    let len = y.len();
    let head = head_len(y.as_ptr(), len);
    for k in 0..head {
        y[k] += alpha * x[k];
    }

    let factor = T::splat(alpha);
    let mut i = head;
    while i + T::LANES <= len {
        // SAFETY: `i + LANES <= len` for both slices and `y + i` is aligned.
        unsafe {
            let target = y.as_mut_ptr().add(i);
            let product = <T as SimdFloat>::mul(factor, T::load_unaligned(x.as_ptr().add(i)));
            let sum = <T as SimdFloat>::add(T::load_aligned(target), product);
            T::store_aligned(target, sum);
        }
        i += T::LANES;
    }
    for k in i..len {
        y[k] += alpha * x[k];
    }
}

/// Computes the sum of `a[i] * b[i]`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn dot<T: SimdFloat>(a: &[T], b: &[T]) -> T {
    assert_eq!(a.len(), b.len(), "dot operands differ in length");
    let len = a.len();
    let mut acc = T::splat(T::default());
    let mut i = 0;
    while i + T::LANES <= len {
        // SAFETY: `i + LANES <= len` for both slices.
        unsafe {
            let lhs = T::load_unaligned(a.as_ptr().add(i));
            let rhs = T::load_unaligned(b.as_ptr().add(i));
            acc = <T as SimdFloat>::add(acc, <T as SimdFloat>::mul(lhs, rhs));
        }
        i += T::LANES;
    }
    let mut sum = T::reduce_sum(acc);
    for k in i..len {
        sum += a[k] * b[k];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[repr(C, align(64))]
    struct Aligned<T>([T; 32]);

    #[test]
    fn test_aligned_store_fills_register() {
        let mut buf = Aligned([0.0f64; 32]);
        store(&mut buf.0, splat(2.5f64));
        assert!(buf.0[..f64::LANES].iter().all(|&v| v == 2.5));
        assert!(buf.0[f64::LANES..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_integer_widths() {
        let mut shorts = Aligned([0i16; 32]);
        store(&mut shorts.0, splat(-7i16));
        assert!(shorts.0[..i16::LANES].iter().all(|&v| v == -7));

        let mut words = Aligned([0u32; 32]);
        store(&mut words.0, splat(u32::MAX));
        assert!(words.0[..u32::LANES].iter().all(|&v| v == u32::MAX));

        let mut longs = Aligned([0i64; 32]);
        storeu(&mut longs.0[1..], splat(42i64));
        assert_eq!(longs.0[0], 0);
        assert!(longs.0[1..=i64::LANES].iter().all(|&v| v == 42));
    }

    #[test]
    fn test_load_store_round_trip() {
        let src = Aligned([1.5f32; 32]);
        let mut dst = Aligned([0.0f32; 32]);
        store(&mut dst.0, load(&src.0));
        assert_eq!(&dst.0[..f32::LANES], &src.0[..f32::LANES]);
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    #[test]
    #[should_panic(expected = "misaligned SIMD store")]
    fn test_misaligned_store_panics() {
        let mut buf = Aligned([0.0f64; 32]);
        store(&mut buf.0[1..], splat(1.0f64));
    }

    #[test]
    #[should_panic(expected = "shorter than one register")]
    fn test_short_store_panics() {
        let mut buf = Aligned([0u64; 32]);
        let empty: &mut [u64] = &mut buf.0[..0];
        storeu(empty, splat(1u64));
    }

    #[test]
    fn test_copy_unaligned_offsets() {
        let src: Vec<i32> = (0..101).collect();
        for offset in 0..4 {
            let mut dst = vec![0i32; 101];
            copy(&mut dst[offset..], &src[offset..]);
            assert_eq!(&dst[offset..], &src[offset..]);
            assert!(dst[..offset].iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_axpy_and_dot() {
        let x: Vec<f32> = (0..53u8).map(f32::from).collect();
        let mut y = vec![1.0f32; 53];
        axpy(&mut y[3..], 2.0, &x[3..]);
        assert_eq!(y[0], 1.0);
        assert_eq!(y[10], 21.0);
        assert_eq!(y[52], 105.0);

        let ones = vec![1.0f64; 29];
        let values: Vec<f64> = (1..=29u8).map(f64::from).collect();
        assert_eq!(dot(&ones, &values), 435.0);
    }

    // Integer-valued floats keep the vector and scalar sums exact
    fn values(len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec((-50i32..50).prop_map(f64::from), len)
    }

    fn kernel_operands() -> impl Strategy<Value = (usize, Vec<f64>, Vec<f64>)> {
        (0usize..70).prop_flat_map(|len| (0..=len.min(7), values(len), values(len)))
    }

    proptest! {
        #[test]
        fn copy_matches_slice_copy((offset, x, _y) in kernel_operands()) {
            let mut dst = vec![0.0f64; x.len()];
            copy(&mut dst[offset..], &x[offset..]);
            prop_assert!(dst[..offset].iter().all(|&v| v == 0.0));
            prop_assert_eq!(&dst[offset..], &x[offset..]);
        }

        #[test]
        fn axpy_matches_scalar_loop(
            (offset, x, mut y) in kernel_operands(),
            alpha in -4i32..4,
        ) {
            let alpha = f64::from(alpha);
            let want: Vec<f64> = y
                .iter()
                .zip(&x)
                .enumerate()
                .map(|(k, (&yk, &xk))| if k < offset { yk } else { yk + alpha * xk })
                .collect();
            axpy(&mut y[offset..], alpha, &x[offset..]);
            prop_assert_eq!(y, want);
        }

        #[test]
        fn dot_matches_scalar_sum((offset, x, y) in kernel_operands()) {
            let want: f64 = x[offset..].iter().zip(&y[offset..]).map(|(a, b)| a * b).sum();
            prop_assert_eq!(dot(&x[offset..], &y[offset..]), want);
        }
    }

    #[test]
    fn test_tier_matches_lanes() {
        match TIER {
            SimdTier::Scalar => assert_eq!(f64::LANES, 1),
            SimdTier::Sse2 => assert_eq!(f64::LANES, 2),
            SimdTier::Avx | SimdTier::Avx2 => assert_eq!(f64::LANES, 4),
            SimdTier::Avx512 => assert_eq!(f64::LANES, 8),
        }
    }
}
