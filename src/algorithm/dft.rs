use num_complex::Complex;
use num_traits::Zero;

use crate::common::{inverse_scale, verify_length, FftNum};
use crate::twiddles;
use crate::{Fft, FftDirection, Length};

/// Naive O(n^2) Discrete Fourier Transform implementation
///
/// This implementation is primarily used to test other FFT algorithms. The mixed-radix engine also falls back to it
/// for a codelet leaf that declines a call, where its cost is bounded by the codelet's size rather than the FFT's.
///
/// ~~~
/// // Computes a naive DFT of size 123
/// use wisefft::algorithm::Dft;
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 123];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 123];
///
/// let dft = Dft::new(123);
/// dft.process_outofplace_with_scratch(&input, &mut output, &mut [], FftDirection::Forward);
/// ~~~
pub struct Dft<T> {
    twiddles: Vec<Complex<T>>,
}

impl<T: FftNum> Dft<T> {
    /// Preallocates necessary arrays and precomputes necessary data to efficiently compute Dft
    pub fn new(len: usize) -> Self {
        Self {
            twiddles: twiddles::generate_twiddle_factors(len),
        }
    }

    fn perform_fft_out_of_place(
        &self,
        signal: &[Complex<T>],
        spectrum: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        for (k, output_cell) in spectrum.iter_mut().enumerate() {
            *output_cell = Zero::zero();
            let mut twiddle_index = 0;

            for input_cell in signal {
                let twiddle = twiddles::directed(self.twiddles[twiddle_index], direction);
                *output_cell = *output_cell + twiddle * input_cell;

                twiddle_index += k;
                if twiddle_index >= self.twiddles.len() {
                    twiddle_index -= self.twiddles.len();
                }
            }
        }

        if direction == FftDirection::Inverse {
            let scale = inverse_scale::<T>(self.len());
            for output_cell in spectrum.iter_mut() {
                *output_cell = *output_cell * scale;
            }
        }
    }
}

impl<T: FftNum> Fft<T> for Dft<T> {
    fn process_outofplace_with_scratch(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        _scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) -> bool {
        verify_length(input, output, self.len());

        self.perform_fft_out_of_place(input, output, direction);
        true
    }
    #[inline(always)]
    fn get_scratch_len(&self) -> usize {
        0
    }
}
impl<T> Length for Dft<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.twiddles.len()
    }
}
