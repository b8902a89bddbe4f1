//! Compares every plan strategy against the naive DFT, and checks the algebraic properties a correct FFT has:
//! inverse(forward(x)) == x, a unit impulse transforms to all ones, and energy is preserved.

use std::sync::Arc;

use rand::distributions::{uniform::SampleUniform, Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};

use wisefft::algorithm::Dft;
use wisefft::num_complex::Complex;
use wisefft::num_traits::{Float, Zero};
use wisefft::{
    CodeletRegistry, CpuFeatures, Fft, FftDirection, FftNum, Plan, PlanFlags, Planner, Strategy,
    Wisdom,
};

const REFERENCE_SIZES: [usize; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 13, 16, 17, 31, 251];

const STRATEGIES: [Strategy; 6] = [
    Strategy::Auto,
    Strategy::Dit,
    Strategy::Stockham,
    Strategy::SixStep,
    Strategy::MixedRadix,
    Strategy::Bluestein,
];

const RNG_SEED: [u8; 32] = [
    7, 1, 3, 9, 2, 8, 4, 6, 5, 1, 0, 3, 7, 7, 2, 9, 4, 1, 8, 8, 6, 3, 5, 0, 2, 4, 6, 8, 1, 3, 5, 7,
];

fn random_signal<T: FftNum + SampleUniform>(len: usize) -> Vec<Complex<T>> {
    let dist: Uniform<T> = Uniform::new(T::from_f64(-10.0).unwrap(), T::from_f64(10.0).unwrap());
    let mut rng: StdRng = SeedableRng::from_seed(RNG_SEED);
    (0..len)
        .map(|_| Complex::new(dist.sample(&mut rng), dist.sample(&mut rng)))
        .collect()
}

/// A planner with its own registry and wisdom, so that tests running in parallel can't influence each other
fn isolated_planner<T: FftNum>() -> Planner<T> {
    Planner::with_context(
        Arc::new(CodeletRegistry::with_builtin_codelets()),
        Some(Arc::new(Wisdom::new())),
        CpuFeatures::detect(),
    )
}

fn naive_dft<T: FftNum>(input: &[Complex<T>], direction: FftDirection) -> Vec<Complex<T>> {
    let dft = Dft::new(input.len());
    let mut output = vec![Complex::zero(); input.len()];
    dft.process_outofplace_with_scratch(input, &mut output, &mut [], direction);
    output
}

/// The largest elementwise error, relative to the largest magnitude in `expected`
fn relative_error<T: FftNum + Float>(actual: &[Complex<T>], expected: &[Complex<T>]) -> f64 {
    assert_eq!(actual.len(), expected.len());
    let scale = expected
        .iter()
        .map(|element| element.norm().to_f64().unwrap())
        .fold(1.0, f64::max);
    let error = actual
        .iter()
        .zip(expected.iter())
        .map(|(a, b)| (a - b).norm().to_f64().unwrap())
        .fold(0.0, f64::max);
    error / scale
}

fn energy<T: FftNum + Float>(buffer: &[Complex<T>]) -> f64 {
    buffer
        .iter()
        .map(|element| element.norm_sqr().to_f64().unwrap())
        .sum()
}

fn check_reference<T: FftNum + Float + SampleUniform>(len: usize, strategy: Strategy, tolerance: f64) {
    let planner = isolated_planner::<T>();
    let mut plan = Plan::with_planner(len, &planner, PlanFlags::ESTIMATE, strategy).unwrap();
    let input = random_signal::<T>(len);
    let mut output = vec![Complex::zero(); len];

    for direction in [FftDirection::Forward, FftDirection::Inverse] {
        match direction {
            FftDirection::Forward => plan.forward(&mut output, &input).unwrap(),
            FftDirection::Inverse => plan.inverse(&mut output, &input).unwrap(),
        }
        let error = relative_error(&output, &naive_dft(&input, direction));
        assert!(
            error < tolerance,
            "len = {}, strategy = {}, algorithm = {}, direction = {}, error = {}",
            len,
            strategy,
            plan.algorithm(),
            direction,
            error
        );
    }
}

fn check_round_trip<T: FftNum + Float + SampleUniform>(len: usize, strategy: Strategy, tolerance: f64) {
    let planner = isolated_planner::<T>();
    let mut plan = Plan::with_planner(len, &planner, PlanFlags::ESTIMATE, strategy).unwrap();
    let input = random_signal::<T>(len);

    let mut spectrum = vec![Complex::zero(); len];
    plan.forward(&mut spectrum, &input).unwrap();
    let mut recovered = vec![Complex::zero(); len];
    plan.inverse(&mut recovered, &spectrum).unwrap();

    let error = relative_error(&recovered, &input);
    assert!(
        error < tolerance,
        "len = {}, strategy = {}, error = {}",
        len,
        strategy,
        error
    );

    // Parseval: the forward transform scales energy by exactly len
    let expected = energy(&input) * len as f64;
    let actual = energy(&spectrum);
    assert!(
        ((actual - expected) / expected).abs() < tolerance * 10.0,
        "len = {}, strategy = {}, spectrum energy {} != {}",
        len,
        strategy,
        actual,
        expected
    );
    assert!(((energy(&recovered) - energy(&input)) / energy(&input)).abs() < tolerance * 10.0);
}

#[test]
fn test_known_spectra() {
    let cases: [(&[(f32, f32)], &[(f32, f32)]); 4] = [
        (&[(1.0, 0.0), (-1.0, 0.0)], &[(0.0, 0.0), (2.0, 0.0)]),
        (
            &[(1.0, 1.0), (2.0, -3.0), (-1.0, 4.0)],
            &[(2.0, 2.0), (-5.562177, -2.098076), (6.562178, 3.09807)],
        ),
        (
            &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0), (5.0, 5.0), (6.0, 6.0)],
            &[
                (21.0, 21.0),
                (-8.19615, 2.19615),
                (-4.73205, -1.26795),
                (-3.0, -3.0),
                (-1.26795, -4.73205),
                (2.19615, -8.19615),
            ],
        ),
        (
            &[(0.0, 1.0), (2.5, -3.0), (-1.0, -1.0), (4.0, 0.0)],
            &[(5.5, -3.0), (-2.0, 3.5), (-7.5, 3.0), (4.0, 0.5)],
        ),
    ];

    let planner = isolated_planner::<f32>();
    for (signal, spectrum) in cases {
        let signal: Vec<_> = signal.iter().map(|&(re, im)| Complex::new(re, im)).collect();
        let spectrum: Vec<_> = spectrum.iter().map(|&(re, im)| Complex::new(re, im)).collect();

        for strategy in STRATEGIES {
            let mut plan =
                Plan::with_planner(signal.len(), &planner, PlanFlags::ESTIMATE, strategy).unwrap();
            let mut output = vec![Complex::zero(); signal.len()];
            plan.forward(&mut output, &signal).unwrap();
            assert!(
                relative_error(&output, &spectrum) < 1e-4,
                "len = {}, strategy = {}: {:?} != {:?}",
                signal.len(),
                strategy,
                output,
                spectrum
            );
        }
    }
}

#[test]
fn test_reference_sizes_f32() {
    for len in REFERENCE_SIZES {
        for strategy in STRATEGIES {
            check_reference::<f32>(len, strategy, 1e-3);
        }
    }
}

#[test]
fn test_reference_sizes_f64() {
    for len in REFERENCE_SIZES {
        for strategy in STRATEGIES {
            check_reference::<f64>(len, strategy, 1e-9);
        }
    }
}

#[test]
fn test_round_trip_reference_sizes() {
    for len in REFERENCE_SIZES {
        for strategy in STRATEGIES {
            check_round_trip::<f32>(len, strategy, 1e-4);
            check_round_trip::<f64>(len, strategy, 1e-10);
        }
    }
}

#[test]
fn test_impulse() {
    let planner = isolated_planner::<f64>();
    for len in (1..=64).chain([100, 128, 243, 251, 256, 1000]) {
        for strategy in STRATEGIES {
            let mut plan = Plan::with_planner(len, &planner, PlanFlags::ESTIMATE, strategy).unwrap();
            let mut impulse = vec![Complex::zero(); len];
            impulse[0] = Complex::new(1.0, 0.0);
            plan.in_place(&mut impulse).unwrap();

            for element in impulse {
                assert!(
                    (element - Complex::new(1.0, 0.0)).norm() < 1e-10,
                    "len = {}, strategy = {}",
                    len,
                    strategy
                );
            }
        }
    }
}

#[test]
fn test_bluestein_prime_round_trip() {
    let mut plan = Plan::<f64>::with_flags(13, PlanFlags::ESTIMATE).unwrap();
    assert_eq!(plan.strategy(), Strategy::Bluestein);

    let input: Vec<Complex<f64>> = (0..13).map(|i| Complex::new(i as f64, 0.0)).collect();
    let mut data = input.clone();
    plan.in_place(&mut data).unwrap();
    plan.inverse_in_place(&mut data).unwrap();

    for (actual, expected) in data.iter().zip(input.iter()) {
        assert!((actual - expected).norm() < 1e-10, "{} != {}", actual, expected);
    }
}

macro_rules! test_accuracy_for_len {
    ($($len:expr),*) => {
        $(
            paste::paste! {
                #[test]
                fn [<test_accuracy_ $len>]() {
                    for strategy in STRATEGIES {
                        check_reference::<f32>($len, strategy, 1e-3);
                        check_reference::<f64>($len, strategy, 1e-9);
                        check_round_trip::<f32>($len, strategy, 1e-4);
                        check_round_trip::<f64>($len, strategy, 1e-10);
                    }
                }
            }
        )*
    }
}

// powers of two, highly composite sizes, and primes large enough to stress Bluestein's inner transform
test_accuracy_for_len!(
    32, 64, 512, 1024, 4096, 30, 360, 1000, 1280, 2160, 97, 1201, 1031
);
