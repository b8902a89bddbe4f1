//! Portable fixed-size kernels, registered at [`SimdLevel::Scalar`] in every default registry.
//!
//! Each kernel follows the [`CodeletFn`] contract: it declines (returns false) when handed buffers of the
//! wrong size, and its inverse applies the `1/size` scale itself.

use num_complex::Complex;
use num_traits::Zero;

use crate::algorithm::butterflies::{Butterfly2, Butterfly4};
use crate::common::{normalize, FftNum};
use crate::registry::{CodeletEntry, CodeletFn, CodeletRegistry};
use crate::twiddles;
use crate::{FftDirection, SimdLevel, Strategy};

#[inline(always)]
fn accepts<T>(dst: &[T], src: &[T], twiddles: &[T], len: usize) -> bool {
    dst.len() == len && src.len() == len && twiddles.len() == len
}

#[inline(always)]
fn dft4<T: FftNum>(
    x0: Complex<T>,
    x1: Complex<T>,
    x2: Complex<T>,
    x3: Complex<T>,
    direction: FftDirection,
) -> [Complex<T>; 4] {
    let sum02 = x0 + x2;
    let diff02 = x0 - x2;
    let sum13 = x1 + x3;
    let diff13 = twiddles::rotate_90(x1 - x3, direction);
    [
        sum02 + sum13,
        diff02 + diff13,
        sum02 - sum13,
        diff02 - diff13,
    ]
}

fn dit4<T: FftNum>(dst: &mut [Complex<T>], src: &[Complex<T>], direction: FftDirection) {
    let result = dft4(src[0], src[1], src[2], src[3], direction);
    dst.copy_from_slice(&result);
    if direction == FftDirection::Inverse {
        normalize(dst, 4);
    }
}

pub fn dit4_forward<T: FftNum>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, 4) {
        return false;
    }
    dit4(dst, src, FftDirection::Forward);
    true
}

pub fn dit4_inverse<T: FftNum>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, 4) {
        return false;
    }
    dit4(dst, src, FftDirection::Inverse);
    true
}

fn dit8<T: FftNum>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    direction: FftDirection,
) {
    let evens = dft4(src[0], src[2], src[4], src[6], direction);
    let odds = dft4(src[1], src[3], src[5], src[7], direction);

    let odd0 = odds[0];
    let odd1 = odds[1] * twiddles::directed(twiddles[1], direction);
    let odd2 = twiddles::rotate_90(odds[2], direction);
    let odd3 = odds[3] * twiddles::directed(twiddles[3], direction);

    dst[0] = evens[0] + odd0;
    dst[1] = evens[1] + odd1;
    dst[2] = evens[2] + odd2;
    dst[3] = evens[3] + odd3;
    dst[4] = evens[0] - odd0;
    dst[5] = evens[1] - odd1;
    dst[6] = evens[2] - odd2;
    dst[7] = evens[3] - odd3;

    if direction == FftDirection::Inverse {
        normalize(dst, 8);
    }
}

pub fn dit8_forward<T: FftNum>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, 8) {
        return false;
    }
    dit8(dst, src, twiddles, FftDirection::Forward);
    true
}

pub fn dit8_inverse<T: FftNum>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, 8) {
        return false;
    }
    dit8(dst, src, twiddles, FftDirection::Inverse);
    true
}

// radix-2 DIT over a compile-time size. the bit reversal is computed on the fly
fn radix2_kernel<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    direction: FftDirection,
) {
    let mut work = [Complex::<T>::zero(); N];
    let shift = usize::BITS - N.trailing_zeros();
    for (i, element) in work.iter_mut().enumerate() {
        *element = src[i.reverse_bits() >> shift];
    }

    let mut span = 2;
    while span <= N {
        let half = span / 2;
        let twiddle_stride = N / span;
        for block in work.chunks_exact_mut(span) {
            let (left, right) = block.split_at_mut(half);
            for k in 0..half {
                right[k] = right[k] * twiddles::directed(twiddles[k * twiddle_stride], direction);
                Butterfly2::perform_fft_strided(&mut left[k], &mut right[k]);
            }
        }
        span *= 2;
    }

    dst.copy_from_slice(&work);
    if direction == FftDirection::Inverse {
        normalize(dst, N);
    }
}

// radix-4 DIT over a compile-time size, which must be a power of 4. the digit reversal is computed on the fly
fn radix4_kernel<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    direction: FftDirection,
) {
    let num_digits = N.trailing_zeros() / 2;
    let mut work = [Complex::<T>::zero(); N];
    for (i, element) in work.iter_mut().enumerate() {
        let mut source = i;
        let mut reversed = 0;
        for _ in 0..num_digits {
            reversed = (reversed << 2) | (source & 3);
            source >>= 2;
        }
        *element = src[reversed];
    }

    let butterfly4 = Butterfly4::new();
    let mut span = 4;
    while span <= N {
        let quarter = span / 4;
        let twiddle_stride = N / span;
        for block in work.chunks_exact_mut(span) {
            for k in 0..quarter {
                let mut value0 = block[k];
                let mut value1 = block[k + quarter]
                    * twiddles::directed(twiddles[k * twiddle_stride], direction);
                let mut value2 = block[k + 2 * quarter]
                    * twiddles::directed(twiddles[2 * k * twiddle_stride], direction);
                let mut value3 = block[k + 3 * quarter]
                    * twiddles::directed(twiddles[3 * k * twiddle_stride], direction);

                butterfly4.perform_fft_strided(
                    &mut value0,
                    &mut value1,
                    &mut value2,
                    &mut value3,
                    direction,
                );

                block[k] = value0;
                block[k + quarter] = value1;
                block[k + 2 * quarter] = value2;
                block[k + 3 * quarter] = value3;
            }
        }
        span *= 4;
    }

    dst.copy_from_slice(&work);
    if direction == FftDirection::Inverse {
        normalize(dst, N);
    }
}

pub fn radix2_forward<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, N) {
        return false;
    }
    radix2_kernel::<T, N>(dst, src, twiddles, FftDirection::Forward);
    true
}

pub fn radix2_inverse<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, N) {
        return false;
    }
    radix2_kernel::<T, N>(dst, src, twiddles, FftDirection::Inverse);
    true
}

pub fn radix4_forward<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, N) {
        return false;
    }
    radix4_kernel::<T, N>(dst, src, twiddles, FftDirection::Forward);
    true
}

pub fn radix4_inverse<T: FftNum, const N: usize>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
) -> bool {
    if !accepts(dst, src, twiddles, N) {
        return false;
    }
    radix4_kernel::<T, N>(dst, src, twiddles, FftDirection::Inverse);
    true
}

fn generic_entry<T: FftNum>(
    size: usize,
    forward: CodeletFn<T>,
    inverse: CodeletFn<T>,
    signature: &'static str,
    priority: i32,
) -> CodeletEntry<T> {
    CodeletEntry {
        size,
        forward,
        inverse,
        algorithm: Strategy::Dit,
        simd_level: SimdLevel::Scalar,
        signature,
        priority,
    }
}

/// Registers the portable codelets for sizes 4, 8, 16, 32 and 64
pub(crate) fn register_builtin<T: FftNum>(registry: &CodeletRegistry<T>) {
    registry.register(generic_entry(4, dit4_forward, dit4_inverse, "dit4_generic", 0));
    registry.register(generic_entry(8, dit8_forward, dit8_inverse, "dit8_generic", 0));

    registry.register(generic_entry(
        16,
        radix2_forward::<T, 16>,
        radix2_inverse::<T, 16>,
        "dit16_radix2_generic",
        0,
    ));
    registry.register(generic_entry(
        16,
        radix4_forward::<T, 16>,
        radix4_inverse::<T, 16>,
        "dit16_radix4_generic",
        10,
    ));
    registry.register(generic_entry(
        32,
        radix2_forward::<T, 32>,
        radix2_inverse::<T, 32>,
        "dit32_radix2_generic",
        0,
    ));
    registry.register(generic_entry(
        64,
        radix2_forward::<T, 64>,
        radix2_inverse::<T, 64>,
        "dit64_radix2_generic",
        0,
    ));
    registry.register(generic_entry(
        64,
        radix4_forward::<T, 64>,
        radix4_inverse::<T, 64>,
        "dit64_radix4_generic",
        10,
    ));
}
