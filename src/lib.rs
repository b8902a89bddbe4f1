#![allow(clippy::needless_range_loop)]
#![allow(clippy::erasing_op)]
#![allow(clippy::identity_op)]
#![allow(clippy::new_without_default)]

//! wisefft computes forward and inverse FFTs of any length, at single and double precision,
//! through reusable plans that never allocate once they are built.
//!
//! ### Usage
//!
//! The recommended way to use wisefft is to create a [`Plan`](crate::Plan) for the length you need.
//! The plan resolves which algorithm to use (a registered fixed-size codelet, a decision recorded in the
//! [`Wisdom`](crate::Wisdom) cache, or a heuristic default), precomputes every table that algorithm needs,
//! and owns the scratch space it writes through.
//!
//! ```rust
//! use wisefft::{Plan, num_complex::Complex};
//!
//! let mut plan = Plan::<f32>::new(1234).unwrap();
//!
//! let input = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1234];
//! let mut spectrum = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1234];
//! plan.forward(&mut spectrum, &input).unwrap();
//!
//! let mut recovered = vec![Complex{ re: 0.0f32, im: 0.0f32 }; 1234];
//! plan.inverse(&mut recovered, &spectrum).unwrap();
//! ```
//!
//! Inverse transforms are normalized: `inverse(forward(x))` reproduces `x`.
//!
//! ### Algorithms
//!
//! * Power-of-two lengths use the decimation-in-time engine ([`Dit`](crate::algorithm::Dit)), the
//!   Stockham autosort engine ([`Stockham`](crate::algorithm::Stockham)), or the six-step engine
//!   ([`SixStep`](crate::algorithm::SixStep)), which splits very large sizes into cache-sized row transforms.
//!   Stockham is the default, and six-step is chosen by forcing it or through wisdom.
//! * Lengths whose prime factors are all 2, 3 or 5 use the mixed-radix engine
//!   ([`MixedRadix`](crate::algorithm::MixedRadix)).
//! * Every other length, including primes, goes through Bluestein's algorithm
//!   ([`BluesteinsAlgorithm`](crate::algorithm::BluesteinsAlgorithm)), which embeds the transform in a
//!   power-of-two convolution.
//!
//! Fixed-size kernels ("codelets") can be registered in a [`CodeletRegistry`](crate::CodeletRegistry)
//! together with the CPU capability level they require. The planner binds a matching codelet directly,
//! and the mixed-radix engine uses registered sizes as atomic radices.
//!
//! ### Concurrency
//!
//! A plan owns mutable scratch space, so executing it takes `&mut self`. To transform from several threads
//! at once, [`Clone`](crate::Plan#impl-Clone-for-Plan<T>) the plan: clones share the precomputed tables and
//! get their own scratch. The codelet registries and the wisdom cache are internally synchronized.

pub use num_complex;
pub use num_traits;

use num_complex::Complex;

mod array_utils;
mod capability;
mod common;
mod convolution;
mod error;
mod math_utils;
mod plan;
mod planner;
mod registry;
mod twiddles;
mod wisdom;

pub mod algorithm;

#[cfg(test)]
mod test_utils;

pub use crate::capability::{CpuFeatures, SimdLevel};
pub use crate::common::{FftNum, Precision};
pub use crate::convolution::convolve;
pub use crate::error::{FftError, WisdomError};
pub use crate::math_utils::{
    bit_reversal, digit_reversal, is_highly_composite, mixed_radix_permutation,
};
pub use crate::plan::{Plan, PlanFlags, PlanOptions};
pub use crate::planner::{EstimateSource, PlanEstimate, Planner, Strategy};
pub use crate::registry::{CodeletEntry, CodeletFn, CodeletRegistry};
pub use crate::twiddles::generate_twiddle_factors;
pub use crate::wisdom::{Wisdom, WisdomEntry, WisdomKey};

/// A trait that allows FFT algorithms to report their expected input/output size
pub trait Length {
    /// The FFT size that this algorithm can process
    fn len(&self) -> usize;
}

/// Represents a FFT direction, IE a forward FFT or an inverse FFT
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum FftDirection {
    Forward,
    Inverse,
}
impl FftDirection {
    /// Returns the opposite direction of `self`.
    ///
    ///  - If `self` is `FftDirection::Forward`, returns `FftDirection::Inverse`
    ///  - If `self` is `FftDirection::Inverse`, returns `FftDirection::Forward`
    #[inline]
    pub fn opposite_direction(&self) -> FftDirection {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }
}
impl std::fmt::Display for FftDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Forward => f.write_str("Forward"),
            Self::Inverse => f.write_str("Inverse"),
        }
    }
}

/// Trait for algorithms that compute FFTs.
///
/// Unlike a [`Plan`], an `Fft` is immutable: all state it writes through is provided by the caller as
/// `scratch`, whose required size is reported by [`get_scratch_len`](Fft::get_scratch_len). That's what
/// lets a plan share one algorithm instance between all of its clones.
///
/// The direction is chosen per call. Forward transforms are unnormalized, inverse transforms are scaled by `1/len()`.
pub trait Fft<T: FftNum>: Length + Sync + Send {
    /// Computes a FFT of `input`, storing the result in `output`.
    ///
    /// `input` and `output` must both have length `self.len()`, and `scratch` must be at least
    /// `self.get_scratch_len()` long. The contents of `scratch` are garbage afterwards.
    ///
    /// Returns `false` if this implementation declined the call, in which case `output` holds no
    /// meaningful data and the caller must fall back to another implementation.
    fn process_outofplace_with_scratch(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
        direction: FftDirection,
    ) -> bool;

    /// Returns the size of the scratch buffer required by `process_outofplace_with_scratch`
    fn get_scratch_len(&self) -> usize;
}
