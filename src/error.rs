use std::error::Error;
use std::fmt::Formatter;

/// Errors reported by plan construction and execution.
///
/// Every check runs before any buffer is written, so an `Err` return guarantees the destination is untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FftError {
    /// The requested transform length is zero.
    InvalidLength,
    /// A required buffer is empty.
    NilSlice,
    /// A buffer doesn't have the length the plan expects, or is too short for the requested stride.
    LengthMismatch { expected: usize, actual: usize },
    /// A stride is zero, or the strided index computation would overflow.
    InvalidStride,
    /// Reserved for real-input transforms, whose spectra must satisfy conjugate symmetry.
    InvalidSpectrum,
    /// Reserved for features that aren't implemented.
    NotImplemented,
}

impl Error for FftError {}

impl std::fmt::Display for FftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FftError::InvalidLength => f.write_str("Invalid FFT length, it must be at least 1"),
            FftError::NilSlice => f.write_str("Cannot execute FFT on an empty buffer"),
            FftError::LengthMismatch { expected, actual } => f.write_fmt(format_args!(
                "Buffer length expected to be {expected}, but it was {actual}"
            )),
            FftError::InvalidStride => f.write_str("Invalid stride for this buffer layout"),
            FftError::InvalidSpectrum => f.write_str("Spectrum violates the expected symmetry"),
            FftError::NotImplemented => f.write_str("Not implemented"),
        }
    }
}

/// Errors reported while importing or exporting wisdom.
#[derive(Debug)]
pub enum WisdomError {
    Io(std::io::Error),
    /// A record couldn't be parsed. `line` is 1-based.
    Malformed { line: usize, reason: String },
    /// An algorithm name that can't be written as a single record field: empty, or containing whitespace.
    InvalidAlgorithm(String),
}

impl Error for WisdomError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WisdomError::Io(err) => Some(err),
            WisdomError::Malformed { .. } | WisdomError::InvalidAlgorithm(_) => None,
        }
    }
}

impl std::fmt::Display for WisdomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WisdomError::Io(err) => f.write_fmt(format_args!("Wisdom I/O failed: {err}")),
            WisdomError::Malformed { line, reason } => {
                f.write_fmt(format_args!("Malformed wisdom record on line {line}: {reason}"))
            }
            WisdomError::InvalidAlgorithm(name) => {
                f.write_fmt(format_args!("Invalid wisdom algorithm name {name:?}"))
            }
        }
    }
}

impl From<std::io::Error> for WisdomError {
    fn from(err: std::io::Error) -> Self {
        WisdomError::Io(err)
    }
}
