//! x86-64 register implementations.

use std::arch::x86_64::*;

use super::{SimdElement, SimdFloat};

macro_rules! float_element {
    (
        $t:ty, $reg:ty,
        $load:ident, $loadu:ident, $store:ident, $storeu:ident, $set1:ident,
        $add:ident, $mul:ident
    ) => {
        impl SimdElement for $t {
            type Register = $reg;
            const LANES: usize = std::mem::size_of::<$reg>() / std::mem::size_of::<$t>();
            const ALIGNMENT: usize = std::mem::size_of::<$reg>();

            #[inline]
            unsafe fn load_aligned(src: *const Self) -> $reg {
                $load(src)
            }

            #[inline]
            unsafe fn load_unaligned(src: *const Self) -> $reg {
                $loadu(src)
            }

            #[inline]
            unsafe fn store_aligned(dst: *mut Self, value: $reg) {
                $store(dst, value);
            }

            #[inline]
            unsafe fn store_unaligned(dst: *mut Self, value: $reg) {
                $storeu(dst, value);
            }

            #[inline]
            #[allow(unused_unsafe)]
            fn splat(value: Self) -> $reg {
                // SAFETY: the instruction set is enabled at compile time.
                unsafe { $set1(value) }
            }
        }

        impl SimdFloat for $t {
            #[inline]
            #[allow(unused_unsafe)]
            fn add(a: $reg, b: $reg) -> $reg {
                // SAFETY: the instruction set is enabled at compile time.
                unsafe { $add(a, b) }
            }

            #[inline]
            #[allow(unused_unsafe)]
            fn mul(a: $reg, b: $reg) -> $reg {
                // SAFETY: the instruction set is enabled at compile time.
                unsafe { $mul(a, b) }
            }

            #[inline]
            fn reduce_sum(value: $reg) -> Self {
                let mut lanes = [<$t>::default(); 16];
                // SAFETY: `lanes` holds at least `LANES` elements.
                unsafe { $storeu(lanes.as_mut_ptr(), value) };
                lanes[..<$t as SimdElement>::LANES].iter().sum()
            }
        }
    };
}

macro_rules! int_element {
    (
        $t:ty, $reg:ty, $ptr:ty, $cast:ty,
        $load:ident, $loadu:ident, $store:ident, $storeu:ident, $set1:ident
    ) => {
        impl SimdElement for $t {
            type Register = $reg;
            const LANES: usize = std::mem::size_of::<$reg>() / std::mem::size_of::<$t>();
            const ALIGNMENT: usize = std::mem::size_of::<$reg>();

            #[inline]
            unsafe fn load_aligned(src: *const Self) -> $reg {
                $load(src.cast::<$ptr>())
            }

            #[inline]
            unsafe fn load_unaligned(src: *const Self) -> $reg {
                $loadu(src.cast::<$ptr>())
            }

            #[inline]
            unsafe fn store_aligned(dst: *mut Self, value: $reg) {
                $store(dst.cast::<$ptr>(), value);
            }

            #[inline]
            unsafe fn store_unaligned(dst: *mut Self, value: $reg) {
                $storeu(dst.cast::<$ptr>(), value);
            }

            #[inline]
            #[allow(unused_unsafe, clippy::cast_possible_wrap, clippy::unnecessary_cast)]
            fn splat(value: Self) -> $reg {
                // SAFETY: the instruction set is enabled at compile time.
                unsafe { $set1(value as $cast) }
            }
        }
    };
}

#[cfg(target_feature = "avx512f")]
#[rustfmt::skip]
mod float {
    use super::*;

    float_element!(f32, __m512, _mm512_load_ps, _mm512_loadu_ps, _mm512_store_ps, _mm512_storeu_ps, _mm512_set1_ps, _mm512_add_ps, _mm512_mul_ps);
    float_element!(f64, __m512d, _mm512_load_pd, _mm512_loadu_pd, _mm512_store_pd, _mm512_storeu_pd, _mm512_set1_pd, _mm512_add_pd, _mm512_mul_pd);
}

#[cfg(all(target_feature = "avx", not(target_feature = "avx512f")))]
#[rustfmt::skip]
mod float {
    use super::*;

    float_element!(f32, __m256, _mm256_load_ps, _mm256_loadu_ps, _mm256_store_ps, _mm256_storeu_ps, _mm256_set1_ps, _mm256_add_ps, _mm256_mul_ps);
    float_element!(f64, __m256d, _mm256_load_pd, _mm256_loadu_pd, _mm256_store_pd, _mm256_storeu_pd, _mm256_set1_pd, _mm256_add_pd, _mm256_mul_pd);
}

#[cfg(not(target_feature = "avx"))]
#[rustfmt::skip]
mod float {
    use super::*;

    float_element!(f32, __m128, _mm_load_ps, _mm_loadu_ps, _mm_store_ps, _mm_storeu_ps, _mm_set1_ps, _mm_add_ps, _mm_mul_ps);
    float_element!(f64, __m128d, _mm_load_pd, _mm_loadu_pd, _mm_store_pd, _mm_storeu_pd, _mm_set1_pd, _mm_add_pd, _mm_mul_pd);
}

#[cfg(target_feature = "avx512f")]
#[rustfmt::skip]
mod wide_int {
    use super::*;

    int_element!(i32, __m512i, i32, i32, _mm512_load_epi32, _mm512_loadu_epi32, _mm512_store_epi32, _mm512_storeu_epi32, _mm512_set1_epi32);
    int_element!(u32, __m512i, i32, i32, _mm512_load_epi32, _mm512_loadu_epi32, _mm512_store_epi32, _mm512_storeu_epi32, _mm512_set1_epi32);
    int_element!(i64, __m512i, i64, i64, _mm512_load_epi64, _mm512_loadu_epi64, _mm512_store_epi64, _mm512_storeu_epi64, _mm512_set1_epi64);
    int_element!(u64, __m512i, i64, i64, _mm512_load_epi64, _mm512_loadu_epi64, _mm512_store_epi64, _mm512_storeu_epi64, _mm512_set1_epi64);
}

#[cfg(all(target_feature = "avx2", not(target_feature = "avx512f")))]
#[rustfmt::skip]
mod wide_int {
    use super::*;

    int_element!(i32, __m256i, __m256i, i32, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi32);
    int_element!(u32, __m256i, __m256i, i32, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi32);
    int_element!(i64, __m256i, __m256i, i64, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi64x);
    int_element!(u64, __m256i, __m256i, i64, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi64x);
}

#[cfg(not(target_feature = "avx2"))]
#[rustfmt::skip]
mod wide_int {
    use super::*;

    int_element!(i32, __m128i, __m128i, i32, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi32);
    int_element!(u32, __m128i, __m128i, i32, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi32);
    int_element!(i64, __m128i, __m128i, i64, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi64x);
    int_element!(u64, __m128i, __m128i, i64, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi64x);
}

#[cfg(target_feature = "avx2")]
#[rustfmt::skip]
mod short_int {
    use super::*;

    int_element!(i16, __m256i, __m256i, i16, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi16);
    int_element!(u16, __m256i, __m256i, i16, _mm256_load_si256, _mm256_loadu_si256, _mm256_store_si256, _mm256_storeu_si256, _mm256_set1_epi16);
}

#[cfg(not(target_feature = "avx2"))]
#[rustfmt::skip]
mod short_int {
    use super::*;

    int_element!(i16, __m128i, __m128i, i16, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi16);
    int_element!(u16, __m128i, __m128i, i16, _mm_load_si128, _mm_loadu_si128, _mm_store_si128, _mm_storeu_si128, _mm_set1_epi16);
}
