//! Single-lane fallback for targets without a vector tier.

use super::{SimdElement, SimdFloat};

macro_rules! scalar_element {
    ($($t:ty),*) => {
        $(
            impl SimdElement for $t {
                type Register = $t;
                const LANES: usize = 1;
                const ALIGNMENT: usize = std::mem::align_of::<$t>();

                #[inline]
                unsafe fn load_aligned(src: *const Self) -> Self {
                    src.read()
                }

                #[inline]
                unsafe fn load_unaligned(src: *const Self) -> Self {
                    src.read_unaligned()
                }

                #[inline]
                unsafe fn store_aligned(dst: *mut Self, value: Self) {
                    dst.write(value);
                }

                #[inline]
                unsafe fn store_unaligned(dst: *mut Self, value: Self) {
                    dst.write_unaligned(value);
                }

                #[inline]
                fn splat(value: Self) -> Self {
                    value
                }
            }
        )*
    };
}

scalar_element!(i16, u16, i32, u32, i64, u64, f32, f64);

macro_rules! scalar_float {
    ($($t:ty),*) => {
        $(
            impl SimdFloat for $t {
                #[inline]
                fn add(a: Self, b: Self) -> Self {
                    a + b
                }

                #[inline]
                fn mul(a: Self, b: Self) -> Self {
                    a * b
                }

                #[inline]
                fn reduce_sum(value: Self) -> Self {
                    value
                }
            }
        )*
    };
}

scalar_float!(f32, f64);
