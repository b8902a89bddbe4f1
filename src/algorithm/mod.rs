//! Individual FFT algorithms.
//!
//! The [`Plan`](crate::Plan) chooses between these automatically, but they can also be used directly through the
//! [`Fft`](crate::Fft) trait. Every algorithm takes the direction per call, and keeps a single forward twiddle table
//! that inverse calls conjugate on the fly.

mod bluesteins_algorithm;
pub(crate) mod butterflies;
pub(crate) mod codelets;
mod dft;
mod dit;
mod mixed_radix;
mod six_step;
mod stockham;

pub use self::bluesteins_algorithm::BluesteinsAlgorithm;
pub use self::butterflies::{Butterfly2, Butterfly3, Butterfly4, Butterfly5};
pub use self::dft::Dft;
pub use self::dit::{Dit, DitRadix};
pub use self::mixed_radix::{mixed_radix_schedule, MixedRadix};
pub use self::six_step::SixStep;
pub use self::stockham::Stockham;
