use crate::{common::FftNum, FftDirection};
use num_complex::Complex;

/// Computes `exp(-2πi·index/fft_len)` for a forward FFT, or its conjugate for an inverse FFT
pub fn compute_twiddle<T: FftNum>(
    index: usize,
    fft_len: usize,
    direction: FftDirection,
) -> Complex<T> {
    let constant = -2f64 * std::f64::consts::PI / fft_len as f64;
    let angle = constant * index as f64;

    let result = Complex {
        re: T::from_f64(angle.cos()).unwrap(),
        im: T::from_f64(angle.sin()).unwrap(),
    };

    match direction {
        FftDirection::Forward => result,
        FftDirection::Inverse => result.conj(),
    }
}

/// Returns the `fft_len` roots of unity `W[k] = exp(-2πi·k/fft_len)`, in ascending angle order.
///
/// Every engine keeps exactly one of these tables. Inverse transforms conjugate the entries they read.
pub fn generate_twiddle_factors<T: FftNum>(fft_len: usize) -> Vec<Complex<T>> {
    (0..fft_len)
        .map(|i| compute_twiddle(i, fft_len, FftDirection::Forward))
        .collect()
}

/// Reads a twiddle from a forward table, conjugating it for inverse transforms
#[inline(always)]
pub fn directed<T: FftNum>(twiddle: Complex<T>, direction: FftDirection) -> Complex<T> {
    match direction {
        FftDirection::Forward => twiddle,
        FftDirection::Inverse => twiddle.conj(),
    }
}

/// Multiplies `value` by `-i` for forward transforms, or by `+i` for inverse transforms
#[inline(always)]
pub fn rotate_90<T: FftNum>(value: Complex<T>, direction: FftDirection) -> Complex<T> {
    match direction {
        FftDirection::Forward => Complex {
            re: value.im,
            im: -value.re,
        },
        FftDirection::Inverse => Complex {
            re: -value.im,
            im: value.re,
        },
    }
}
