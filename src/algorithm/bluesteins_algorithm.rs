use std::sync::Arc;

use num_complex::Complex;
use num_traits::Zero;

use crate::common::{inverse_scale, verify_length, verify_length_minimum, FftNum};
use crate::{Fft, FftDirection, Length};

/// Implementation of Bluestein's Algorithm
///
/// This algorithm computes an arbitrary-sized FFT in O(nlogn) time. It does this by converting this size n FFT into a
/// size M FFT, where M >= 2N - 1. The planner always chooses M to be a power of two, and computes the inner FFT with
/// the Stockham engine.
///
/// It requires a large scratch space, so it's probably inconvenient to use as an inner FFT to other algorithms.
///
/// ~~~
/// // Computes a forward FFT of size 1201 (prime number), using Bluestein's Algorithm
/// use std::sync::Arc;
/// use wisefft::algorithm::{BluesteinsAlgorithm, Stockham};
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1201];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1201];
///
/// // the inner FFT must be at least 2 * 1201 - 1 = 2401 long
/// let inner_fft = Arc::new(Stockham::new(4096));
///
/// let fft = BluesteinsAlgorithm::new(1201, inner_fft);
/// let mut scratch = vec![Complex{ re: 0.0f32, im: 0.0f32 }; fft.get_scratch_len()];
/// fft.process_outofplace_with_scratch(&input, &mut output, &mut scratch, FftDirection::Forward);
/// ~~~
///
/// Bluestein's Algorithm is relatively expensive compared to other FFT algorithms. Its inner FFT is between two and
/// four times longer than the FFT itself, and it runs that inner FFT twice per call.
pub struct BluesteinsAlgorithm<T> {
    inner_fft: Arc<dyn Fft<T>>,

    // FFT of the conjugate chirp, zero-padded to the inner length
    inner_fft_multiplier: Box<[Complex<T>]>,
    // the forward chirp, exp(-iπk²/len)
    twiddles: Box<[Complex<T>]>,
}

impl<T: FftNum> BluesteinsAlgorithm<T> {
    fn compute_bluesteins_twiddle(index: usize, len: usize) -> Complex<T> {
        // k² only matters mod 2len, and reducing it first keeps the angle small
        let index_squared = (index as u128 * index as u128) % (2 * len as u128);
        let theta = -std::f64::consts::PI * index_squared as f64 / len as f64;

        Complex::new(
            T::from_f64(theta.cos()).unwrap(),
            T::from_f64(theta.sin()).unwrap(),
        )
    }

    /// Creates a FFT instance which will process inputs/outputs of size `len`. `inner_fft.len()` must be >= `len * 2 - 1`
    ///
    /// Note that this constructor is quite expensive to run; This algorithm must run a FFT of size inner_fft.len() within the
    /// constructor. This further underlines the fact that Bluesteins Algorithm is more expensive to run than other
    /// FFT algorithms
    pub fn new(len: usize, inner_fft: Arc<dyn Fft<T>>) -> Self {
        assert!(len > 0, "Bluestein's algorithm requires a nonzero length");
        let inner_fft_len = inner_fft.len();
        assert!(len * 2 - 1 <= inner_fft_len, "Bluestein's algorithm requires inner_fft.len() >= self.len() * 2 - 1. Expected >= {}, got {}", len * 2 - 1, inner_fft_len);

        let twiddles: Vec<Complex<T>> = (0..len)
            .map(|i| Self::compute_bluesteins_twiddle(i, len))
            .collect();

        // the convolution filter is the conjugate chirp, wrapped around so that negative indexes land at the end
        let mut inner_fft_input = vec![Complex::zero(); inner_fft_len];
        for (i, twiddle) in twiddles.iter().enumerate() {
            inner_fft_input[i] = twiddle.conj();
        }
        for i in 1..len {
            inner_fft_input[inner_fft_len - i] = twiddles[i].conj();
        }

        //Compute the inner fft
        let mut inner_fft_multiplier = vec![Complex::zero(); inner_fft_len];
        let mut inner_fft_scratch = vec![Complex::zero(); inner_fft.get_scratch_len()];
        inner_fft.process_outofplace_with_scratch(
            &inner_fft_input,
            &mut inner_fft_multiplier,
            &mut inner_fft_scratch,
            FftDirection::Forward,
        );

        Self {
            inner_fft,
            inner_fft_multiplier: inner_fft_multiplier.into_boxed_slice(),
            twiddles: twiddles.into_boxed_slice(),
        }
    }

    fn perform_fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        let inner_len = self.inner_fft_multiplier.len();
        let (inner_input, scratch) = scratch.split_at_mut(inner_len);
        let (inner_output, inner_scratch) = scratch.split_at_mut(inner_len);

        // The inverse transform replaces the chirp with its conjugate. The inverse filter is then the FFT of the
        // unconjugated chirp, which is the forward filter conjugated and index-reversed.
        let chirp = |index: usize| -> Complex<T> {
            match direction {
                FftDirection::Forward => self.twiddles[index],
                FftDirection::Inverse => self.twiddles[index].conj(),
            }
        };

        // Copy the buffer into our inner FFT input. the buffer will only fill part of the FFT input, so zero fill the rest
        for (i, (inner_entry, input_entry)) in inner_input.iter_mut().zip(input.iter()).enumerate() {
            *inner_entry = *input_entry * chirp(i);
        }
        for inner in inner_input.iter_mut().skip(input.len()) {
            *inner = Complex::zero();
        }

        // run our inner forward FFT
        self.inner_fft.process_outofplace_with_scratch(
            inner_input,
            inner_output,
            inner_scratch,
            FftDirection::Forward,
        );

        // Multiply our inner FFT output by our precomputed data
        match direction {
            FftDirection::Forward => {
                for (inner, multiplier) in
                    inner_output.iter_mut().zip(self.inner_fft_multiplier.iter())
                {
                    *inner = *inner * multiplier;
                }
            }
            FftDirection::Inverse => {
                for (i, inner) in inner_output.iter_mut().enumerate() {
                    let mirrored = if i == 0 { 0 } else { inner_len - i };
                    *inner = *inner * self.inner_fft_multiplier[mirrored].conj();
                }
            }
        }

        // inverse FFT, which applies the 1/inner_len normalization of the convolution
        self.inner_fft.process_outofplace_with_scratch(
            inner_output,
            inner_input,
            inner_scratch,
            FftDirection::Inverse,
        );

        // copy our data back to the buffer, applying twiddle factors again as we go
        for (i, (output_entry, inner_entry)) in output.iter_mut().zip(inner_input.iter()).enumerate() {
            *output_entry = *inner_entry * chirp(i);
        }

        if direction == FftDirection::Inverse {
            let scale = inverse_scale::<T>(self.len());
            for output_entry in output.iter_mut() {
                *output_entry = *output_entry * scale;
            }
        }
    }
}

impl<T: FftNum> Fft<T> for BluesteinsAlgorithm<T> {
    fn process_outofplace_with_scratch(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) -> bool {
        verify_length(input, output, self.len());
        verify_length_minimum(scratch, self.get_scratch_len());

        self.perform_fft_out_of_place(input, output, scratch, direction);
        true
    }
    fn get_scratch_len(&self) -> usize {
        2 * self.inner_fft_multiplier.len() + self.inner_fft.get_scratch_len()
    }
}
impl<T> Length for BluesteinsAlgorithm<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.twiddles.len()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::algorithm::{Dft, Stockham};
    use crate::test_utils::check_fft_algorithm;

    #[test]
    fn test_bluesteins_stockham() {
        for len in 1usize..30 {
            let inner_len = (len * 2 - 1).checked_next_power_of_two().unwrap();
            let fft = BluesteinsAlgorithm::new(len, Arc::new(Stockham::<f32>::new(inner_len)));
            check_fft_algorithm::<f32>(&fft, len, FftDirection::Forward);
            check_fft_algorithm::<f32>(&fft, len, FftDirection::Inverse);

            let fft = BluesteinsAlgorithm::new(len, Arc::new(Stockham::<f64>::new(inner_len)));
            check_fft_algorithm::<f64>(&fft, len, FftDirection::Forward);
            check_fft_algorithm::<f64>(&fft, len, FftDirection::Inverse);
        }
    }

    #[test]
    fn test_bluesteins_larger_inner() {
        // any inner length >= 2len - 1 works, it doesn't have to be a power of two
        for &len in &[3, 5, 7, 11, 13, 251] {
            let inner_fft = Arc::new(Dft::<f64>::new(len * 2 + 7));
            let fft = BluesteinsAlgorithm::new(len, inner_fft);
            check_fft_algorithm::<f64>(&fft, len, FftDirection::Forward);
            check_fft_algorithm::<f64>(&fft, len, FftDirection::Inverse);
        }
    }

    #[test]
    #[should_panic]
    fn test_bluesteins_inner_too_short() {
        let _fft = BluesteinsAlgorithm::new(13, Arc::new(Stockham::<f32>::new(16)));
    }
}
