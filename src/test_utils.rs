use num_complex::Complex;
use num_traits::{Float, Zero};

use rand::distributions::{uniform::SampleUniform, Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};

use crate::algorithm::Dft;
use crate::{Fft, FftDirection, FftNum};

/// The seed for the random number generator used to generate
/// random signals. It's defined here so that we have deterministic
/// tests
const RNG_SEED: [u8; 32] = [
    1, 9, 1, 0, 1, 1, 4, 3, 1, 4, 9, 8, 4, 1, 4, 8, 2, 8, 1, 2, 2, 2, 6, 1, 2, 3, 4, 5, 6, 7, 8, 9,
];

pub fn random_signal<T: FftNum + SampleUniform>(length: usize) -> Vec<Complex<T>> {
    let mut sig = Vec::with_capacity(length);
    let dist: Uniform<T> = Uniform::new(T::from_f64(-10.0).unwrap(), T::from_f64(10.0).unwrap());
    let mut rng: StdRng = SeedableRng::from_seed(RNG_SEED);
    for _ in 0..length {
        sig.push(Complex {
            re: (dist.sample(&mut rng)),
            im: (dist.sample(&mut rng)),
        });
    }
    return sig;
}

pub fn compare_vectors<T: FftNum + Float>(vec1: &[Complex<T>], vec2: &[Complex<T>]) -> bool {
    assert_eq!(vec1.len(), vec2.len());
    let mut error = T::zero();
    for (&a, &b) in vec1.iter().zip(vec2.iter()) {
        error = error + (a - b).norm();
    }
    return (error.to_f64().unwrap() / vec1.len() as f64) < 0.1f64;
}

/// Runs `fft` on a random signal and compares the result with the naive DFT.
///
/// The scratch buffer is filled with garbage first, so algorithms that rely on zeroed scratch fail here.
pub fn check_fft_algorithm<T: FftNum + Float + SampleUniform>(
    fft: &dyn Fft<T>,
    len: usize,
    direction: FftDirection,
) {
    assert_eq!(
        fft.len(),
        len,
        "Algorithm reported incorrect size. Expected {}, got {}",
        len,
        fft.len()
    );

    let input = random_signal(len);
    let mut expected_output = vec![Zero::zero(); len];
    let reference = Dft::new(len);
    reference.process_outofplace_with_scratch(&input, &mut expected_output, &mut [], direction);

    let mut actual_output = vec![Zero::zero(); len];
    let mut scratch = random_signal(fft.get_scratch_len());
    let handled = fft.process_outofplace_with_scratch(
        &input,
        &mut actual_output,
        &mut scratch,
        direction,
    );
    assert!(handled, "algorithm declined a valid call, len = {}", len);

    assert!(
        compare_vectors(&expected_output, &actual_output),
        "process_outofplace_with_scratch() failed, length = {}, direction = {}",
        len,
        direction
    );

    // a second run through the same scratch must give the same answer
    let mut second_output = vec![Zero::zero(); len];
    fft.process_outofplace_with_scratch(&input, &mut second_output, &mut scratch, direction);
    assert!(
        compare_vectors(&actual_output, &second_output),
        "second run through the same scratch differs, length = {}, direction = {}",
        len,
        direction
    );
}
