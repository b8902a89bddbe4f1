use num_complex::Complex;
use num_traits::{FromPrimitive, Signed};
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use crate::registry::CodeletRegistry;

/// The floating point precision of a transform. Part of every wisdom key.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum Precision {
    Single,
    Double,
}
impl Precision {
    /// The tag used for this precision in the wisdom text format
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Single => "f32",
            Self::Double => "f64",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "f32" => Some(Self::Single),
            "f64" => Some(Self::Double),
            _ => None,
        }
    }
}

/// Generic floating point number, implemented for f32 and f64
///
/// Each implementation carries its own process-wide codelet registry, so choosing a precision at compile time
/// also chooses which set of codelets the default planner consults.
pub trait FftNum: Copy + FromPrimitive + Signed + Sync + Send + Debug + 'static {
    const PRECISION: Precision;

    /// Returns the process-wide codelet registry for this precision, populated with the built-in
    /// portable codelets on first use.
    fn default_registry() -> Arc<CodeletRegistry<Self>>;
}

impl FftNum for f32 {
    const PRECISION: Precision = Precision::Single;

    fn default_registry() -> Arc<CodeletRegistry<f32>> {
        static REGISTRY: OnceLock<Arc<CodeletRegistry<f32>>> = OnceLock::new();
        Arc::clone(REGISTRY.get_or_init(|| Arc::new(CodeletRegistry::with_builtin_codelets())))
    }
}
impl FftNum for f64 {
    const PRECISION: Precision = Precision::Double;

    fn default_registry() -> Arc<CodeletRegistry<f64>> {
        static REGISTRY: OnceLock<Arc<CodeletRegistry<f64>>> = OnceLock::new();
        Arc::clone(REGISTRY.get_or_init(|| Arc::new(CodeletRegistry::with_builtin_codelets())))
    }
}

/// Returns `1 / len` in the requested precision
#[inline]
pub(crate) fn inverse_scale<T: FftNum>(len: usize) -> T {
    T::from_f64(1.0 / len as f64).unwrap()
}

/// Multiplies every element of `buffer` by `1 / len`
#[inline]
pub(crate) fn normalize<T: FftNum>(buffer: &mut [Complex<T>], len: usize) {
    let scale = inverse_scale::<T>(len);
    for element in buffer.iter_mut() {
        *element = *element * scale;
    }
}

#[inline(always)]
pub(crate) fn verify_length<T>(input: &[T], output: &[T], expected: usize) {
    assert_eq!(
        input.len(),
        expected,
        "Input is the wrong length. Expected {}, got {}",
        expected,
        input.len()
    );
    assert_eq!(
        output.len(),
        expected,
        "Output is the wrong length. Expected {}, got {}",
        expected,
        output.len()
    );
}

#[inline(always)]
pub(crate) fn verify_length_minimum<T>(buffer: &[T], minimum: usize) {
    assert!(
        buffer.len() >= minimum,
        "Buffer is the wrong length. Expected len >= {}, got {}",
        minimum,
        buffer.len()
    );
}
