use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use num_complex::Complex;
use num_traits::Zero;

use crate::array_utils::{gather_strided, scatter_strided, strided_span};
use crate::planner::{Planner, Strategy};
use crate::registry::CodeletEntry;
use crate::twiddles::generate_twiddle_factors;
use crate::{CpuFeatures, Fft, FftDirection, FftError, FftNum, Length};

/// Flags controlling how a plan interacts with the wisdom cache
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PlanFlags(u32);

impl PlanFlags {
    /// Resolve from the registry and heuristics only
    pub const ESTIMATE: PlanFlags = PlanFlags(0);
    /// Adopt a decision recorded in wisdom for this size
    pub const USE_WISDOM: PlanFlags = PlanFlags(1);
    /// Record the resolved algorithm in wisdom
    pub const SAVE_WISDOM: PlanFlags = PlanFlags(1 << 1);
    pub const DEFAULT: PlanFlags = PlanFlags(Self::USE_WISDOM.0 | Self::SAVE_WISDOM.0);

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every flag set in `other` is also set in `self`
    pub fn contains(&self, other: PlanFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for PlanFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for PlanFlags {
    type Output = PlanFlags;
    fn bitor(self, rhs: PlanFlags) -> PlanFlags {
        PlanFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlanFlags {
    fn bitor_assign(&mut self, rhs: PlanFlags) {
        self.0 |= rhs.0;
    }
}

/// Run-time planning configuration
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PlanOptions {
    pub flags: PlanFlags,
    /// Forces an algorithm family. [`Strategy::Auto`] lets the planner choose.
    pub strategy: Strategy,
    /// Overrides the detected CPU features. `None` detects them.
    pub features: Option<CpuFeatures>,
}

impl PlanOptions {
    pub fn with_flags(flags: PlanFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// A reusable FFT of one length and precision.
///
/// A plan resolves its algorithm once, at construction, and precomputes every table that algorithm needs. After that,
/// no transform call allocates. All buffers are validated before anything is written, so an `Err` leaves the
/// destination untouched.
///
/// ```rust
/// use wisefft::{Plan, FftError, num_complex::Complex};
///
/// let mut plan = Plan::<f64>::new(13)?;
///
/// let input: Vec<Complex<f64>> = (0..13).map(|i| Complex::new(i as f64, 0.0)).collect();
/// let mut spectrum = vec![Complex::new(0.0, 0.0); 13];
/// plan.forward(&mut spectrum, &input)?;
///
/// // the inverse is normalized, so this recovers the input
/// plan.inverse_in_place(&mut spectrum)?;
/// for (actual, expected) in spectrum.iter().zip(input.iter()) {
///     assert!((actual - expected).norm() < 1e-10);
/// }
/// # Ok::<(), FftError>(())
/// ```
///
/// Executing a plan takes `&mut self`, because the plan owns the scratch space its algorithm writes through. Clone
/// the plan to transform from several threads at once: clones share the precomputed tables.
pub struct Plan<T: FftNum> {
    fft: Arc<dyn Fft<T>>,
    codelet: Option<CodeletEntry<T>>,
    codelet_twiddles: Arc<[Complex<T>]>,
    strategy: Strategy,
    algorithm: Arc<str>,

    scratch: Box<[Complex<T>]>,
    // input staging for in-place calls, input and output staging for strided calls
    staging: Box<[Complex<T>]>,
}

impl<T: FftNum> Plan<T> {
    /// Creates a plan for length `len` with the default flags, consulting and updating the process-wide wisdom
    pub fn new(len: usize) -> Result<Self, FftError> {
        Self::with_options(len, PlanOptions::default())
    }

    pub fn with_flags(len: usize, flags: PlanFlags) -> Result<Self, FftError> {
        Self::with_options(len, PlanOptions::with_flags(flags))
    }

    pub fn with_options(len: usize, options: PlanOptions) -> Result<Self, FftError> {
        if len == 0 {
            return Err(FftError::InvalidLength);
        }
        let planner = Planner::with_context(
            T::default_registry(),
            Some(crate::Wisdom::global()),
            options.features.unwrap_or_else(CpuFeatures::detect),
        );
        Self::with_planner(len, &planner, options.flags, options.strategy)
    }

    /// Creates a plan using an explicit planner context. `planner.features()` takes the place of
    /// [`PlanOptions::features`].
    pub fn with_planner(
        len: usize,
        planner: &Planner<T>,
        flags: PlanFlags,
        strategy: Strategy,
    ) -> Result<Self, FftError> {
        if len == 0 {
            return Err(FftError::InvalidLength);
        }

        let mut estimate = planner.resolve(len, strategy, flags.contains(PlanFlags::USE_WISDOM));
        let (fft, built) = planner.build_fft(len, estimate.strategy)?;
        estimate.strategy = built;
        if estimate.codelet.is_none() {
            estimate.algorithm = built.name().to_string();
        }

        if flags.contains(PlanFlags::SAVE_WISDOM) {
            planner.record(len, &estimate);
        }

        let codelet_twiddles: Arc<[Complex<T>]> = match estimate.codelet {
            Some(_) => generate_twiddle_factors(len).into(),
            None => Arc::from(Vec::new()),
        };

        let codelet_scratch = if estimate.codelet.is_some() { len } else { 0 };
        let scratch_len = fft.get_scratch_len().max(codelet_scratch);

        Ok(Self {
            scratch: vec![Complex::zero(); scratch_len].into_boxed_slice(),
            staging: vec![Complex::zero(); 2 * len].into_boxed_slice(),
            fft,
            codelet: estimate.codelet,
            codelet_twiddles,
            strategy: estimate.codelet.map_or(built, |codelet| codelet.algorithm),
            algorithm: estimate.algorithm.into(),
        })
    }

    /// The strategy this plan runs: the bound codelet's algorithm family, or the engine's
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The resolved algorithm name, as recorded in wisdom: a codelet signature or a generic strategy name
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn uses_codelet(&self) -> bool {
        self.codelet.is_some()
    }

    /// Computes the forward FFT of `src`, storing the result in `dst`. Forward transforms are unnormalized.
    pub fn forward(&mut self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), FftError> {
        self.validate(dst, src)?;
        self.execute(dst, src, FftDirection::Forward);
        Ok(())
    }

    /// Computes the inverse FFT of `src`, storing the result in `dst`. The result is scaled by `1/len()`.
    pub fn inverse(&mut self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), FftError> {
        self.validate(dst, src)?;
        self.execute(dst, src, FftDirection::Inverse);
        Ok(())
    }

    /// Computes the forward FFT of `data`, overwriting it with the result
    pub fn in_place(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        self.process_in_place(data, FftDirection::Forward)
    }

    /// Computes the inverse FFT of `data`, overwriting it with the result
    pub fn inverse_in_place(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        self.process_in_place(data, FftDirection::Inverse)
    }

    /// Computes the forward FFT of the elements `src[i * stride]`, storing element `i` of the result in
    /// `dst[i * stride]`. Elements between the strided positions are left untouched.
    pub fn forward_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.process_strided(dst, src, stride, FftDirection::Forward)
    }

    /// The strided counterpart of [`inverse`](Plan::inverse)
    pub fn inverse_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.process_strided(dst, src, stride, FftDirection::Inverse)
    }

    fn validate(&self, dst: &[Complex<T>], src: &[Complex<T>]) -> Result<(), FftError> {
        if dst.is_empty() || src.is_empty() {
            return Err(FftError::NilSlice);
        }
        for buffer in [src, dst] {
            if buffer.len() != self.len() {
                return Err(FftError::LengthMismatch {
                    expected: self.len(),
                    actual: buffer.len(),
                });
            }
        }
        Ok(())
    }

    fn process_in_place(
        &mut self,
        data: &mut [Complex<T>],
        direction: FftDirection,
    ) -> Result<(), FftError> {
        self.validate(&*data, &*data)?;

        let mut staging = std::mem::take(&mut self.staging);
        let input = &mut staging[..data.len()];
        input.copy_from_slice(data);
        self.execute(data, input, direction);
        self.staging = staging;
        Ok(())
    }

    fn process_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        stride: usize,
        direction: FftDirection,
    ) -> Result<(), FftError> {
        if dst.is_empty() || src.is_empty() {
            return Err(FftError::NilSlice);
        }
        if stride == 0 {
            return Err(FftError::InvalidStride);
        }
        let required = strided_span(self.len(), stride).ok_or(FftError::InvalidStride)?;
        for buffer in [src, &*dst] {
            if buffer.len() < required {
                return Err(FftError::LengthMismatch {
                    expected: required,
                    actual: buffer.len(),
                });
            }
        }

        let len = self.len();
        let mut staging = std::mem::take(&mut self.staging);
        let (input, output) = staging.split_at_mut(len);
        gather_strided(src, stride, input);
        self.execute(output, input, direction);
        scatter_strided(output, dst, stride);
        self.staging = staging;
        Ok(())
    }

    fn execute(&mut self, dst: &mut [Complex<T>], src: &[Complex<T>], direction: FftDirection) {
        if let Some(codelet) = self.codelet {
            let kernel = match direction {
                FftDirection::Forward => codelet.forward,
                FftDirection::Inverse => codelet.inverse,
            };
            if kernel(dst, src, &self.codelet_twiddles[..], &mut self.scratch[..]) {
                return;
            }
        }

        let handled = self
            .fft
            .process_outofplace_with_scratch(src, dst, &mut self.scratch[..], direction);
        debug_assert!(handled, "built-in engines never decline a validated call");
    }
}

impl<T: FftNum> Length for Plan<T> {
    fn len(&self) -> usize {
        self.fft.len()
    }
}

impl<T: FftNum> Clone for Plan<T> {
    /// Shares the precomputed tables with `self`, and allocates fresh scratch space
    fn clone(&self) -> Self {
        Self {
            fft: Arc::clone(&self.fft),
            codelet: self.codelet,
            codelet_twiddles: Arc::clone(&self.codelet_twiddles),
            strategy: self.strategy,
            algorithm: Arc::clone(&self.algorithm),
            scratch: vec![Complex::zero(); self.scratch.len()].into_boxed_slice(),
            staging: vec![Complex::zero(); self.staging.len()].into_boxed_slice(),
        }
    }
}

impl<T: FftNum> std::fmt::Debug for Plan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("len", &self.len())
            .field("strategy", &self.strategy)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
