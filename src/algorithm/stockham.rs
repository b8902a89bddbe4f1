use num_complex::Complex;

use crate::common::{normalize, verify_length, verify_length_minimum, FftNum};
use crate::twiddles;
use crate::{Fft, FftDirection, Length};

/// Stockham autosort FFT, for power-of-two sizes
///
/// Every radix-2 stage reads one buffer and writes the other, interleaving its outputs so that the data ends
/// up in natural order without any permutation pass. The stages alternate between `output` and `scratch`, and the
/// first stage picks its destination so that the last one lands in `output`.
///
/// ~~~
/// // Computes a forward FFT of size 1024
/// use wisefft::algorithm::Stockham;
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1024];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1024];
///
/// let fft = Stockham::new(1024);
/// let mut scratch = vec![Complex{ re: 0.0f32, im: 0.0f32 }; fft.get_scratch_len()];
/// fft.process_outofplace_with_scratch(&input, &mut output, &mut scratch, FftDirection::Forward);
/// ~~~
pub struct Stockham<T> {
    twiddles: Box<[Complex<T>]>,
    num_stages: u32,
}

impl<T: FftNum> Stockham<T> {
    /// Creates a FFT instance which will process inputs of size `len`. `len` must be a power of two.
    pub fn new(len: usize) -> Self {
        assert!(
            len.is_power_of_two(),
            "Stockham requires a power-of-two length. Got {}",
            len
        );

        Self {
            twiddles: twiddles::generate_twiddle_factors(len).into_boxed_slice(),
            num_stages: len.trailing_zeros(),
        }
    }

    // one radix-2 stage over sub-transforms of size `current_len`, interleaved with stride `stride`
    fn perform_stage(
        &self,
        source: &[Complex<T>],
        destination: &mut [Complex<T>],
        current_len: usize,
        stride: usize,
        direction: FftDirection,
    ) {
        let half = current_len / 2;
        for p in 0..half {
            let twiddle = twiddles::directed(self.twiddles[p * stride], direction);
            for q in 0..stride {
                let a = source[q + stride * p];
                let b = source[q + stride * (p + half)];
                destination[q + stride * 2 * p] = a + b;
                destination[q + stride * (2 * p + 1)] = (a - b) * twiddle;
            }
        }
    }

    fn perform_fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        let len = self.len();
        if self.num_stages == 0 {
            output.copy_from_slice(input);
            return;
        }

        let scratch = &mut scratch[..len];

        // stage i writes into output when (num_stages - 1 - i) is even, so the final stage always does
        let writes_to_output = |stage: u32| (self.num_stages - 1 - stage) % 2 == 0;

        let mut current_len = len;
        let mut stride = 1;
        if writes_to_output(0) {
            self.perform_stage(input, output, current_len, stride, direction);
        } else {
            self.perform_stage(input, scratch, current_len, stride, direction);
        }

        for stage in 1..self.num_stages {
            current_len /= 2;
            stride *= 2;
            if writes_to_output(stage) {
                self.perform_stage(scratch, output, current_len, stride, direction);
            } else {
                self.perform_stage(output, scratch, current_len, stride, direction);
            }
        }

        if direction == FftDirection::Inverse {
            normalize(output, len);
        }
    }
}

impl<T: FftNum> Fft<T> for Stockham<T> {
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
    #[inline(always)]
    fn get_scratch_len(&self) -> usize {
        if self.num_stages > 0 {
            self.len()
        } else {
            0
        }
    }
}
impl<T> Length for Stockham<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.twiddles.len()
    }
}
