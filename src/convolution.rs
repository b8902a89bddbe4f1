use num_complex::Complex;
use num_traits::Zero;

use crate::{FftError, FftNum, Plan, PlanFlags};

/// Computes the linear convolution of `a` and `b`, storing the result in `dst`.
///
/// Both inputs are zero-padded to the smallest power of two that holds `a.len() + b.len() - 1` elements, so the
/// circular convolution computed by the FFT equals the linear one. `dst` must be exactly `a.len() + b.len() - 1` long.
///
/// ```rust
/// use wisefft::{convolve, num_complex::Complex};
///
/// let a: Vec<Complex<f64>> = [1.0, 2.0, 3.0].iter().map(|&re| Complex::new(re, 0.0)).collect();
/// let b: Vec<Complex<f64>> = [4.0, 5.0].iter().map(|&re| Complex::new(re, 0.0)).collect();
/// let mut result = vec![Complex::new(0.0, 0.0); 4];
/// convolve(&mut result, &a, &b).unwrap();
///
/// for (actual, expected) in result.iter().zip([4.0, 13.0, 22.0, 15.0]) {
///     assert!((actual.re - expected).abs() < 1e-9);
/// }
/// ```
pub fn convolve<T: FftNum>(
    dst: &mut [Complex<T>],
    a: &[Complex<T>],
    b: &[Complex<T>],
) -> Result<(), FftError> {
    if dst.is_empty() {
        return Err(FftError::NilSlice);
    }
    if a.is_empty() || b.is_empty() {
        return Err(FftError::InvalidLength);
    }
    let result_len = a.len() + b.len() - 1;
    if dst.len() != result_len {
        return Err(FftError::LengthMismatch {
            expected: result_len,
            actual: dst.len(),
        });
    }

    let fft_len = result_len
        .checked_next_power_of_two()
        .ok_or(FftError::InvalidLength)?;
    let mut plan = Plan::with_flags(fft_len, PlanFlags::ESTIMATE)?;

    let mut a_spectrum = vec![Complex::zero(); fft_len];
    a_spectrum[..a.len()].copy_from_slice(a);
    plan.in_place(&mut a_spectrum)?;

    let mut b_spectrum = vec![Complex::zero(); fft_len];
    b_spectrum[..b.len()].copy_from_slice(b);
    plan.in_place(&mut b_spectrum)?;

    for (a_element, b_element) in a_spectrum.iter_mut().zip(b_spectrum.iter()) {
        *a_element = *a_element * b_element;
    }
    plan.inverse_in_place(&mut a_spectrum)?;

    dst.copy_from_slice(&a_spectrum[..result_len]);
    Ok(())
}
