use std::sync::Arc;

use num_complex::Complex;

use crate::common::{verify_length, verify_length_minimum, FftNum};
use crate::twiddles;
use crate::{Fft, FftDirection, Length};

/// Six-step FFT: factors a size `width * height` transform into row transforms of both sizes, joined by twiddle
/// factors and matrix transposes
///
/// Each set of row transforms runs over contiguous memory, which keeps large power-of-two sizes cache friendly.
/// The inner FFTs normalize their own inverse transforms, so the composition is scaled by `1/len()` as well.
///
/// ~~~
/// // Computes a forward FFT of size 1024, as 32 x 32
/// use std::sync::Arc;
/// use wisefft::algorithm::{SixStep, Stockham};
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1024];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1024];
///
/// let fft = SixStep::new(Arc::new(Stockham::<f32>::new(32)), Arc::new(Stockham::<f32>::new(32)));
/// let mut scratch = vec![Complex{ re: 0.0f32, im: 0.0f32 }; fft.get_scratch_len()];
/// fft.process_outofplace_with_scratch(&input, &mut output, &mut scratch, FftDirection::Forward);
/// ~~~
pub struct SixStep<T> {
    twiddles: Box<[Complex<T>]>,

    width_size_fft: Arc<dyn Fft<T>>,
    width: usize,

    height_size_fft: Arc<dyn Fft<T>>,
    height: usize,

    inner_scratch_len: usize,
}

impl<T: FftNum> SixStep<T> {
    /// Creates a FFT instance which will process inputs of size `width_fft.len() * height_fft.len()`
    pub fn new(width_fft: Arc<dyn Fft<T>>, height_fft: Arc<dyn Fft<T>>) -> Self {
        let width = width_fft.len();
        let height = height_fft.len();
        let len = width * height;

        // twiddle for row x, column y of the width x height intermediate matrix
        let mut twiddles = Vec::with_capacity(len);
        for x in 0..width {
            for y in 0..height {
                twiddles.push(twiddles::compute_twiddle(x * y, len, FftDirection::Forward));
            }
        }

        let inner_scratch_len = width_fft
            .get_scratch_len()
            .max(height_fft.get_scratch_len());

        Self {
            twiddles: twiddles.into_boxed_slice(),
            width_size_fft: width_fft,
            width,
            height_size_fft: height_fft,
            height,
            inner_scratch_len,
        }
    }

    /// Splits a power of two into the most square `(width, height)` pair, with `width <= height`
    pub fn split_power_of_two(len: usize) -> (usize, usize) {
        let width = 1 << (len.trailing_zeros() / 2);
        (width, len / width)
    }

    fn perform_fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) -> bool {
        let (buffer, inner_scratch) = scratch.split_at_mut(self.len());
        let inner_scratch = &mut inner_scratch[..self.inner_scratch_len];

        // STEP 1: transpose, so that each column of the input becomes a contiguous row
        transpose::transpose(input, output, self.width, self.height);

        // STEP 2: FFTs of size `height`
        for (row, destination) in output
            .chunks_exact(self.height)
            .zip(buffer.chunks_exact_mut(self.height))
        {
            if !self
                .height_size_fft
                .process_outofplace_with_scratch(row, destination, inner_scratch, direction)
            {
                return false;
            }
        }

        // STEP 3: twiddle factors
        for (element, &twiddle) in buffer.iter_mut().zip(self.twiddles.iter()) {
            *element = *element * twiddles::directed(twiddle, direction);
        }

        // STEP 4: transpose back
        transpose::transpose(buffer, output, self.height, self.width);

        // STEP 5: FFTs of size `width`
        for (row, destination) in output
            .chunks_exact(self.width)
            .zip(buffer.chunks_exact_mut(self.width))
        {
            if !self
                .width_size_fft
                .process_outofplace_with_scratch(row, destination, inner_scratch, direction)
            {
                return false;
            }
        }

        // STEP 6: transpose into natural order
        transpose::transpose(buffer, output, self.width, self.height);
        true
    }
}

impl<T: FftNum> Fft<T> for SixStep<T> {
    fn process_outofplace_with_scratch(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) -> bool {
        verify_length(input, output, self.len());
        verify_length_minimum(scratch, self.get_scratch_len());

        self.perform_fft_out_of_place(input, output, scratch, direction)
    }
    #[inline(always)]
    fn get_scratch_len(&self) -> usize {
        self.len() + self.inner_scratch_len
    }
}
impl<T> Length for SixStep<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.twiddles.len()
    }
}
