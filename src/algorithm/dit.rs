use num_complex::Complex;

use crate::algorithm::butterflies::{Butterfly2, Butterfly4};
use crate::common::{normalize, verify_length, FftNum};
use crate::math_utils::{bit_reversal, digit_reversal};
use crate::twiddles;
use crate::{Fft, FftDirection, Length};

/// The butterfly radix used by the [`Dit`] stages
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DitRadix {
    /// `log2(len)` radix-2 stages after a bit-reversal permutation
    Radix2,
    /// Radix-4 stages. When `log2(len)` is odd, a single radix-2 stage absorbs the odd bit first.
    Radix4,
}

/// Decimation-in-time Cooley-Tukey FFT, for power-of-two sizes
///
/// The input is reordered through a precomputed permutation table, then butterfly stages of increasing span
/// run in place over the output buffer. No scratch is required.
///
/// ~~~
/// // Computes a forward FFT of size 4096
/// use wisefft::algorithm::Dit;
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 4096];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 4096];
///
/// let fft = Dit::new(4096);
/// fft.process_outofplace_with_scratch(&input, &mut output, &mut [], FftDirection::Forward);
/// ~~~
pub struct Dit<T> {
    twiddles: Box<[Complex<T>]>,
    permutation: Box<[usize]>,
    radix: DitRadix,
    butterfly4: Butterfly4<T>,
}

impl<T: FftNum> Dit<T> {
    /// Creates a FFT instance which will process inputs of size `len`, using radix-4 stages. `len` must be a power of two.
    pub fn new(len: usize) -> Self {
        Self::with_radix(len, DitRadix::Radix4)
    }

    /// Creates a FFT instance which will process inputs of size `len` with the given stage radix. `len` must be a power of two.
    pub fn with_radix(len: usize, radix: DitRadix) -> Self {
        assert!(
            len.is_power_of_two(),
            "Dit requires a power-of-two length. Got {}",
            len
        );

        let log2 = len.trailing_zeros();

        // pure radix-4 stages need base-4 digit reversal. every other schedule starts on bit-reversed data
        let permutation = match radix {
            DitRadix::Radix4 if log2 % 2 == 0 => digit_reversal(len, 4),
            _ => bit_reversal(len),
        }
        .unwrap_or_default();

        Self {
            twiddles: twiddles::generate_twiddle_factors(len).into_boxed_slice(),
            permutation: permutation.into_boxed_slice(),
            radix,
            butterfly4: Butterfly4::new(),
        }
    }

    pub fn radix(&self) -> DitRadix {
        self.radix
    }

    fn perform_fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        for (output_element, &source) in output.iter_mut().zip(self.permutation.iter()) {
            *output_element = input[source];
        }

        let len = self.len();
        match self.radix {
            DitRadix::Radix2 => {
                let mut span = 2;
                while span <= len {
                    self.radix2_stage(output, span, direction);
                    span *= 2;
                }
            }
            DitRadix::Radix4 => {
                let mut span = 4;
                if len.trailing_zeros() % 2 == 1 {
                    self.radix2_stage(output, 2, direction);
                    span = 8;
                    while span <= len {
                        self.radix4_stage_bit_reversed(output, span, direction);
                        span *= 4;
                    }
                } else {
                    while span <= len {
                        self.radix4_stage(output, span, direction);
                        span *= 4;
                    }
                }
            }
        }

        if direction == FftDirection::Inverse {
            normalize(output, len);
        }
    }

    fn radix2_stage(&self, buffer: &mut [Complex<T>], span: usize, direction: FftDirection) {
        let half = span / 2;
        let twiddle_stride = self.len() / span;

        for block in buffer.chunks_exact_mut(span) {
            let (left, right) = block.split_at_mut(half);
            for k in 0..half {
                let twiddle = twiddles::directed(self.twiddles[k * twiddle_stride], direction);
                right[k] = right[k] * twiddle;
                Butterfly2::perform_fft_strided(&mut left[k], &mut right[k]);
            }
        }
    }

    // the quarter-blocks of a digit-reversed block hold the sub-DFTs of residues 0, 1, 2, 3 mod 4, in that order
    fn radix4_stage(&self, buffer: &mut [Complex<T>], span: usize, direction: FftDirection) {
        let quarter = span / 4;
        let twiddle_stride = self.len() / span;

        for block in buffer.chunks_exact_mut(span) {
            for k in 0..quarter {
                let twiddle1 = twiddles::directed(self.twiddles[k * twiddle_stride], direction);
                let twiddle2 = twiddles::directed(self.twiddles[2 * k * twiddle_stride], direction);
                let twiddle3 = twiddles::directed(self.twiddles[3 * k * twiddle_stride], direction);

                let mut value0 = block[k];
                let mut value1 = block[k + quarter] * twiddle1;
                let mut value2 = block[k + 2 * quarter] * twiddle2;
                let mut value3 = block[k + 3 * quarter] * twiddle3;

                self.butterfly4.perform_fft_strided(
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
    }

    // on bit-reversed data, the quarter-blocks hold residues 0, 2, 1, 3 mod 4
    fn radix4_stage_bit_reversed(
        &self,
        buffer: &mut [Complex<T>],
        span: usize,
        direction: FftDirection,
    ) {
        let quarter = span / 4;
        let twiddle_stride = self.len() / span;

        for block in buffer.chunks_exact_mut(span) {
            for k in 0..quarter {
                let twiddle1 = twiddles::directed(self.twiddles[k * twiddle_stride], direction);
                let twiddle2 = twiddles::directed(self.twiddles[2 * k * twiddle_stride], direction);
                let twiddle3 = twiddles::directed(self.twiddles[3 * k * twiddle_stride], direction);

                let mut value0 = block[k];
                let mut value1 = block[k + 2 * quarter] * twiddle1;
                let mut value2 = block[k + quarter] * twiddle2;
                let mut value3 = block[k + 3 * quarter] * twiddle3;

                self.butterfly4.perform_fft_strided(
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
    }
}

impl<T: FftNum> Fft<T> for Dit<T> {
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
impl<T> Length for Dit<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.twiddles.len()
    }
}
