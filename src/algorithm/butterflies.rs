use num_complex::Complex;

use crate::common::{normalize, verify_length, FftNum};
use crate::twiddles;
use crate::{Fft, FftDirection, Length};

macro_rules! boilerplate_fft_butterfly {
    ($struct_name:ident, $len:expr) => {
        impl<T: FftNum> Fft<T> for $struct_name<T> {
            fn process_outofplace_with_scratch(
                &self,
                input: &[Complex<T>],
                output: &mut [Complex<T>],
                _scratch: &mut [Complex<T>],
                direction: FftDirection,
            ) -> bool {
                verify_length(input, output, $len);

                output.copy_from_slice(input);
                self.perform_fft_contiguous(output, direction);
                if direction == FftDirection::Inverse {
                    normalize(output, $len);
                }
                true
            }
            #[inline(always)]
            fn get_scratch_len(&self) -> usize {
                0
            }
        }
        impl<T> Length for $struct_name<T> {
            #[inline(always)]
            fn len(&self) -> usize {
                $len
            }
        }
    };
}

/// The closed-form butterfly for a single radix, as used by the stage loops of the DIT and mixed-radix engines.
///
/// Butterflies are unnormalized in both directions: the engines scale once, at the end of an inverse transform.
pub enum RadixButterfly<T> {
    Two(Butterfly2<T>),
    Three(Butterfly3<T>),
    Four(Butterfly4<T>),
    Five(Butterfly5<T>),
}
impl<T: FftNum> RadixButterfly<T> {
    /// Returns the butterfly for `radix`, or None if `radix` isn't 2, 3, 4 or 5
    pub fn new(radix: usize) -> Option<Self> {
        match radix {
            2 => Some(Self::Two(Butterfly2::new())),
            3 => Some(Self::Three(Butterfly3::new())),
            4 => Some(Self::Four(Butterfly4::new())),
            5 => Some(Self::Five(Butterfly5::new())),
            _ => None,
        }
    }

    pub fn radix(&self) -> usize {
        match self {
            Self::Two(_) => 2,
            Self::Three(_) => 3,
            Self::Four(_) => 4,
            Self::Five(_) => 5,
        }
    }

    /// Computes the unnormalized DFT of `buffer` in place. `buffer.len()` must equal `self.radix()`.
    #[inline(always)]
    pub fn perform_fft_contiguous(&self, buffer: &mut [Complex<T>], direction: FftDirection) {
        match self {
            Self::Two(butterfly) => butterfly.perform_fft_contiguous(buffer, direction),
            Self::Three(butterfly) => butterfly.perform_fft_contiguous(buffer, direction),
            Self::Four(butterfly) => butterfly.perform_fft_contiguous(buffer, direction),
            Self::Five(butterfly) => butterfly.perform_fft_contiguous(buffer, direction),
        }
    }
}

pub struct Butterfly2<T> {
    _phantom: std::marker::PhantomData<T>,
}
boilerplate_fft_butterfly!(Butterfly2, 2);
impl<T: FftNum> Butterfly2<T> {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
    #[inline(always)]
    pub(crate) fn perform_fft_strided(left: &mut Complex<T>, right: &mut Complex<T>) {
        let temp = *left + *right;

        *right = *left - *right;
        *left = temp;
    }
    #[inline(always)]
    pub(crate) fn perform_fft_contiguous(&self, buffer: &mut [Complex<T>], _direction: FftDirection) {
        let value0 = buffer[0];
        let value1 = buffer[1];
        buffer[0] = value0 + value1;
        buffer[1] = value0 - value1;
    }
}

pub struct Butterfly3<T> {
    twiddle: Complex<T>,
}
boilerplate_fft_butterfly!(Butterfly3, 3);
impl<T: FftNum> Butterfly3<T> {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            twiddle: twiddles::compute_twiddle(1, 3, FftDirection::Forward),
        }
    }
    #[inline(always)]
    pub(crate) fn perform_fft_strided(
        &self,
        val0: &mut Complex<T>,
        val1: &mut Complex<T>,
        val2: &mut Complex<T>,
        direction: FftDirection,
    ) {
        let twiddle = twiddles::directed(self.twiddle, direction);

        let xp = *val1 + *val2;
        let xn = *val1 - *val2;
        let sum = *val0 + xp;

        let temp_a = *val0
            + Complex {
                re: twiddle.re * xp.re,
                im: twiddle.re * xp.im,
            };
        let temp_b = Complex {
            re: -twiddle.im * xn.im,
            im: twiddle.im * xn.re,
        };

        *val0 = sum;
        *val1 = temp_a + temp_b;
        *val2 = temp_a - temp_b;
    }
    #[inline(always)]
    pub(crate) fn perform_fft_contiguous(&self, buffer: &mut [Complex<T>], direction: FftDirection) {
        let (mut value0, mut value1, mut value2) = (buffer[0], buffer[1], buffer[2]);
        self.perform_fft_strided(&mut value0, &mut value1, &mut value2, direction);
        buffer[0] = value0;
        buffer[1] = value1;
        buffer[2] = value2;
    }
}

pub struct Butterfly4<T> {
    _phantom: std::marker::PhantomData<T>,
}
boilerplate_fft_butterfly!(Butterfly4, 4);
impl<T: FftNum> Butterfly4<T> {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
    #[inline(always)]
    pub(crate) fn perform_fft_strided(
        &self,
        value0: &mut Complex<T>,
        value1: &mut Complex<T>,
        value2: &mut Complex<T>,
        value3: &mut Complex<T>,
        direction: FftDirection,
    ) {
        // first radix-2 stage pairs x0 with x2 and x1 with x3
        Butterfly2::perform_fft_strided(value0, value2);
        Butterfly2::perform_fft_strided(value1, value3);

        // x3 picks up -j for a forward transform, +j for an inverse
        *value3 = twiddles::rotate_90(*value3, direction);

        Butterfly2::perform_fft_strided(value0, value1);
        Butterfly2::perform_fft_strided(value2, value3);

        // outputs come out as X0, X2, X1, X3
        std::mem::swap(value1, value2);
    }
    #[inline(always)]
    pub(crate) fn perform_fft_contiguous(&self, buffer: &mut [Complex<T>], direction: FftDirection) {
        let (mut value0, mut value1, mut value2, mut value3) =
            (buffer[0], buffer[1], buffer[2], buffer[3]);
        self.perform_fft_strided(&mut value0, &mut value1, &mut value2, &mut value3, direction);
        buffer[0] = value0;
        buffer[1] = value1;
        buffer[2] = value2;
        buffer[3] = value3;
    }
}

pub struct Butterfly5<T> {
    twiddle1: Complex<T>,
    twiddle2: Complex<T>,
}
boilerplate_fft_butterfly!(Butterfly5, 5);
impl<T: FftNum> Butterfly5<T> {
    pub fn new() -> Self {
        Self {
            twiddle1: twiddles::compute_twiddle(1, 5, FftDirection::Forward),
            twiddle2: twiddles::compute_twiddle(2, 5, FftDirection::Forward),
        }
    }

    #[inline(never)] // refusing to inline this code reduces code size, and doesn't hurt performance
    pub(crate) fn perform_fft_contiguous(&self, buffer: &mut [Complex<T>], direction: FftDirection) {
        // A plain 5-point DFT, written in terms of W1 and W2 only, using W3 = W2* and W4 = W1*:
        // X0 = x0 + x1 + x2 + x3 + x4
        // X1 = x0 + W1.re*(x1+x4) + W2.re*(x2+x3) + j*(W1.im*(x1-x4) + W2.im*(x2-x3))
        // X2 = x0 + W1.re*(x2+x3) + W2.re*(x1+x4) - j*(W1.im*(x2-x3) - W2.im*(x1-x4))
        // X3 = x0 + W1.re*(x2+x3) + W2.re*(x1+x4) + j*(W1.im*(x2-x3) - W2.im*(x1-x4))
        // X4 = x0 + W1.re*(x1+x4) + W2.re*(x2+x3) - j*(W1.im*(x1-x4) + W2.im*(x2-x3))
        //
        // where Wn = exp(-2*pi*n/5) for a forward transform, and exp(+2*pi*n/5) for an inverse.
        let twiddle1 = twiddles::directed(self.twiddle1, direction);
        let twiddle2 = twiddles::directed(self.twiddle2, direction);

        let x0 = buffer[0];
        let x14p = buffer[1] + buffer[4];
        let x14n = buffer[1] - buffer[4];
        let x23p = buffer[2] + buffer[3];
        let x23n = buffer[2] - buffer[3];
        let sum = x0 + x14p + x23p;

        let b14re_a = x0.re + twiddle1.re * x14p.re + twiddle2.re * x23p.re;
        let b14re_b = twiddle1.im * x14n.im + twiddle2.im * x23n.im;
        let b23re_a = x0.re + twiddle2.re * x14p.re + twiddle1.re * x23p.re;
        let b23re_b = twiddle2.im * x14n.im + -twiddle1.im * x23n.im;

        let b14im_a = x0.im + twiddle1.re * x14p.im + twiddle2.re * x23p.im;
        let b14im_b = twiddle1.im * x14n.re + twiddle2.im * x23n.re;
        let b23im_a = x0.im + twiddle2.re * x14p.im + twiddle1.re * x23p.im;
        let b23im_b = twiddle2.im * x14n.re + -twiddle1.im * x23n.re;

        buffer[0] = sum;
        buffer[1] = Complex {
            re: b14re_a - b14re_b,
            im: b14im_a + b14im_b,
        };
        buffer[2] = Complex {
            re: b23re_a - b23re_b,
            im: b23im_a + b23im_b,
        };
        buffer[3] = Complex {
            re: b23re_a + b23re_b,
            im: b23im_a - b23im_b,
        };
        buffer[4] = Complex {
            re: b14re_a + b14re_b,
            im: b14im_a - b14im_b,
        };
    }
}
