use num_complex::Complex;
use num_traits::Zero;

use crate::algorithm::butterflies::RadixButterfly;
use crate::algorithm::Dft;
use crate::common::{normalize, verify_length, verify_length_minimum, FftNum};
use crate::math_utils::mixed_radix_permutation_table;
use crate::registry::{CodeletEntry, CodeletRegistry};
use crate::twiddles;
use crate::{CpuFeatures, Fft, FftDirection, Length};

/// Computes the radix schedule for a mixed-radix FFT of size `len`, outermost radix first.
///
/// At each step, if `len` isn't yet fully factored and `has_codelet` reports a codelet for the whole remaining size
/// (and that size is larger than 5), the remaining size is taken as a single atomic radix. Otherwise the schedule
/// prefers 5, then 4, then 3, then 2. Returns None if some prime factor of `len` is larger than 5 and no codelet covers it.
///
/// The product of the returned schedule always equals `len`. A length of 1 has an empty schedule.
pub fn mixed_radix_schedule(len: usize, has_codelet: impl Fn(usize) -> bool) -> Option<Vec<usize>> {
    if len == 0 {
        return None;
    }

    let mut schedule = Vec::new();
    let mut remaining = len;
    while remaining > 1 {
        if remaining > 5 && has_codelet(remaining) {
            schedule.push(remaining);
            break;
        }

        let radix = [5, 4, 3, 2]
            .into_iter()
            .find(|radix| remaining % radix == 0)?;
        schedule.push(radix);
        remaining /= radix;
    }
    Some(schedule)
}

struct ButterflyStage<T> {
    butterfly: RadixButterfly<T>,
    // size of the sub-transforms this stage produces
    block_len: usize,
    // size of the sub-transforms this stage consumes, IE block_len / radix
    span: usize,
    twiddle_step: usize,
}

struct CodeletLeaf<T: FftNum> {
    entry: CodeletEntry<T>,
    twiddles: Box<[Complex<T>]>,
    fallback: Dft<T>,
}

/// Generalized mixed-radix FFT, for sizes whose prime factors are all 2, 3 or 5
///
/// The size is factored into a schedule of radices (see [`mixed_radix_schedule`]). The input is scattered once
/// through the mixed-radix permutation of that schedule, after which every sub-transform occupies a contiguous block
/// in natural order. Butterfly stages then run in place over the output, innermost radix first.
///
/// When built [`with_codelets`](MixedRadix::with_codelets), a registered codelet whose size equals the last remaining
/// factor is used as the innermost, atomic radix. The effective decomposition of a size therefore depends on which
/// codelets are registered; for a fixed registry it's deterministic.
///
/// ~~~
/// // Computes a forward FFT of size 1200
/// use wisefft::algorithm::MixedRadix;
/// use wisefft::{Fft, FftDirection};
/// use wisefft::num_complex::Complex;
///
/// let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1200];
/// let mut output = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1200];
///
/// let fft = MixedRadix::new(1200).unwrap();
/// let mut scratch = vec![Complex{ re: 0.0f32, im: 0.0f32 }; fft.get_scratch_len()];
/// fft.process_outofplace_with_scratch(&input, &mut output, &mut scratch, FftDirection::Forward);
/// ~~~
pub struct MixedRadix<T: FftNum> {
    len: usize,
    radices: Box<[usize]>,
    permutation: Box<[usize]>,
    twiddles: Box<[Complex<T>]>,
    stages: Box<[ButterflyStage<T>]>,
    leaf: Option<CodeletLeaf<T>>,
}

impl<T: FftNum> MixedRadix<T> {
    /// Creates a FFT instance for size `len` using only the built-in radix 2, 3, 4 and 5 butterflies.
    ///
    /// Returns None if `len` is zero or has a prime factor larger than 5.
    pub fn new(len: usize) -> Option<Self> {
        let radices = mixed_radix_schedule(len, |_| false)?;
        Some(Self::from_schedule(len, radices, None))
    }

    /// Creates a FFT instance for size `len`, allowing codelets from `registry` that `features` can run to serve as
    /// the innermost radix.
    ///
    /// Returns None if `len` can't be scheduled.
    pub fn with_codelets(
        len: usize,
        registry: &CodeletRegistry<T>,
        features: &CpuFeatures,
    ) -> Option<Self> {
        let radices =
            mixed_radix_schedule(len, |size| registry.lookup(size, features).is_some())?;

        let leaf = match radices.last() {
            Some(&size) if size > 5 => Some(registry.lookup(size, features)?),
            _ => None,
        };
        Some(Self::from_schedule(len, radices, leaf))
    }

    fn from_schedule(len: usize, radices: Vec<usize>, leaf: Option<CodeletEntry<T>>) -> Self {
        let butterfly_radices = match leaf {
            Some(_) => &radices[..radices.len() - 1],
            None => &radices[..],
        };

        let mut stages = Vec::with_capacity(butterfly_radices.len());
        let mut block_len = len;
        for &radix in butterfly_radices {
            if let Some(butterfly) = RadixButterfly::new(radix) {
                let span = block_len / radix;
                stages.push(ButterflyStage {
                    butterfly,
                    block_len,
                    span,
                    twiddle_step: len / block_len,
                });
                block_len = span;
            }
        }
        // the permutation leaves the innermost sub-transforms in place, so the stages run innermost first
        stages.reverse();

        let leaf = leaf.map(|entry| CodeletLeaf {
            twiddles: twiddles::generate_twiddle_factors(entry.size).into_boxed_slice(),
            fallback: Dft::new(entry.size),
            entry,
        });

        log::trace!(
            "mixed radix schedule for len {}: {:?}{}",
            len,
            radices,
            match &leaf {
                Some(leaf) => format!(" (codelet leaf {})", leaf.entry.signature),
                None => String::new(),
            }
        );

        Self {
            len,
            permutation: mixed_radix_permutation_table(len, &radices).into_boxed_slice(),
            radices: radices.into_boxed_slice(),
            twiddles: twiddles::generate_twiddle_factors(len).into_boxed_slice(),
            stages: stages.into_boxed_slice(),
            leaf,
        }
    }

    /// The radix schedule, outermost first
    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Returns the signature of the codelet used as the innermost radix, if any
    pub fn leaf_codelet(&self) -> Option<&'static str> {
        self.leaf.as_ref().map(|leaf| leaf.entry.signature)
    }

    fn perform_stage(
        &self,
        buffer: &mut [Complex<T>],
        stage: &ButterflyStage<T>,
        direction: FftDirection,
    ) {
        let radix = stage.butterfly.radix();
        let span = stage.span;
        let mut values = [Complex::zero(); 5];

        for block in buffer.chunks_exact_mut(stage.block_len) {
            for k in 0..span {
                values[0] = block[k];
                for j in 1..radix {
                    let twiddle = twiddles::directed(
                        self.twiddles[j * k * stage.twiddle_step],
                        direction,
                    );
                    values[j] = block[j * span + k] * twiddle;
                }

                stage
                    .butterfly
                    .perform_fft_contiguous(&mut values[..radix], direction);

                for j in 0..radix {
                    block[j * span + k] = values[j];
                }
            }
        }
    }

    fn perform_leaf(
        &self,
        leaf: &CodeletLeaf<T>,
        buffer: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        let (leaf_output, leaf_scratch) = scratch.split_at_mut(leaf.entry.size);
        let kernel = match direction {
            FftDirection::Forward => leaf.entry.forward,
            FftDirection::Inverse => leaf.entry.inverse,
        };

        for block in buffer.chunks_exact_mut(leaf.entry.size) {
            if !kernel(leaf_output, block, &leaf.twiddles, leaf_scratch) {
                leaf.fallback
                    .process_outofplace_with_scratch(block, leaf_output, &mut [], direction);
            }
            block.copy_from_slice(leaf_output);
        }
    }

    fn perform_fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) {
        for (&element, &destination) in input.iter().zip(self.permutation.iter()) {
            output[destination] = element;
        }

        let mut scale_len = self.len;
        if let Some(leaf) = &self.leaf {
            self.perform_leaf(leaf, output, scratch, direction);
            // the codelet's inverse already applied 1/size
            scale_len /= leaf.entry.size;
        }

        for stage in self.stages.iter() {
            self.perform_stage(output, stage, direction);
        }

        if direction == FftDirection::Inverse && scale_len > 1 {
            normalize(output, scale_len);
        }
    }
}

impl<T: FftNum> Fft<T> for MixedRadix<T> {
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
        self.leaf.as_ref().map_or(0, |leaf| 2 * leaf.entry.size)
    }
}
impl<T: FftNum> Length for MixedRadix<T> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}
