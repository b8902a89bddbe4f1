use std::sync::Arc;

use wisefft::num_complex::Complex;
use wisefft::num_traits::Zero;
use wisefft::{
    convolve, CodeletRegistry, CpuFeatures, FftError, Length, Plan, PlanFlags, PlanOptions,
    Planner, Precision, Strategy, Wisdom, WisdomKey,
};

fn ramp(len: usize) -> Vec<Complex<f64>> {
    (0..len)
        .map(|i| Complex::new(i as f64, (len - i) as f64 * 0.5))
        .collect()
}

#[test]
fn test_invalid_arguments() {
    assert_eq!(Plan::<f32>::new(0).err(), Some(FftError::InvalidLength));
    assert_eq!(Plan::<f64>::new(0).err(), Some(FftError::InvalidLength));

    let mut plan = Plan::<f64>::with_flags(3, PlanFlags::ESTIMATE).unwrap();
    assert_eq!(plan.len(), 3);
    let src = ramp(3);
    let mut dst = vec![Complex::zero(); 3];

    assert_eq!(plan.forward(&mut [], &src), Err(FftError::NilSlice));
    assert_eq!(plan.forward(&mut dst, &[]), Err(FftError::NilSlice));
    assert_eq!(plan.inverse(&mut [], &src), Err(FftError::NilSlice));
    assert_eq!(
        plan.forward(&mut dst, &ramp(4)),
        Err(FftError::LengthMismatch {
            expected: 3,
            actual: 4
        })
    );
    assert_eq!(
        plan.inverse_in_place(&mut ramp(2)),
        Err(FftError::LengthMismatch {
            expected: 3,
            actual: 2
        })
    );
    assert!(dst.iter().all(|element| element.is_zero()));
}

#[test]
fn test_convolve() {
    let a = [1.0, 2.0, 3.0].map(|re| Complex::new(re, 0.0));
    let b = [4.0, 5.0].map(|re| Complex::new(re, 0.0));
    let mut dst = vec![Complex::zero(); 4];
    convolve(&mut dst, &a, &b).unwrap();

    for (actual, expected) in dst.iter().zip([4.0, 13.0, 22.0, 15.0]) {
        assert!((actual - Complex::new(expected, 0.0)).norm() < 1e-10);
    }

    let mut dst32 = vec![Complex::<f32>::zero(); 2];
    assert_eq!(
        convolve(&mut dst32, &[Complex::zero(); 2], &[Complex::zero(); 2]),
        Err(FftError::LengthMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn test_strided_columns() {
    // transform every column of a row-major 6x8 matrix
    let rows = 6;
    let columns = 8;
    let matrix = ramp(rows * columns);
    let mut transformed = vec![Complex::zero(); rows * columns];

    let mut plan = Plan::<f64>::with_flags(rows, PlanFlags::ESTIMATE).unwrap();
    for column in 0..columns {
        plan.forward_strided(&mut transformed[column..], &matrix[column..], columns)
            .unwrap();
    }

    for column in 0..columns {
        let input: Vec<_> = matrix[column..].iter().step_by(columns).copied().collect();
        let mut expected = vec![Complex::zero(); rows];
        plan.forward(&mut expected, &input).unwrap();

        let actual: Vec<_> = transformed[column..].iter().step_by(columns).copied().collect();
        assert_eq!(actual, expected, "column {}", column);
    }
}

#[test]
fn test_forced_options() {
    let options = PlanOptions {
        flags: PlanFlags::ESTIMATE,
        strategy: Strategy::Dit,
        features: Some(CpuFeatures::generic()),
    };
    let plan = Plan::<f32>::with_options(1024, options).unwrap();
    assert_eq!(plan.strategy(), Strategy::Dit);
    assert_eq!(plan.algorithm(), "dit_fallback");

    let plan = Plan::<f32>::with_options(
        1024,
        PlanOptions {
            flags: PlanFlags::ESTIMATE,
            ..PlanOptions::with_strategy(Strategy::Bluestein)
        },
    )
    .unwrap();
    assert_eq!(plan.strategy(), Strategy::Bluestein);

    let mut plan = Plan::<f64>::with_options(
        1 << 14,
        PlanOptions {
            flags: PlanFlags::ESTIMATE,
            ..PlanOptions::with_strategy(Strategy::SixStep)
        },
    )
    .unwrap();
    assert_eq!(plan.strategy(), Strategy::SixStep);
    assert_eq!(plan.algorithm(), "sixstep");
    let input = ramp(1 << 14);
    let mut data = input.clone();
    plan.in_place(&mut data).unwrap();
    plan.inverse_in_place(&mut data).unwrap();
    for (actual, expected) in data.iter().zip(input.iter()) {
        assert!((actual - expected).norm() < 1e-6);
    }

    // a forced power-of-two engine falls through on other sizes
    let plan = Plan::<f32>::with_options(
        90,
        PlanOptions {
            flags: PlanFlags::ESTIMATE,
            ..PlanOptions::with_strategy(Strategy::Stockham)
        },
    )
    .unwrap();
    assert_eq!(plan.strategy(), Strategy::MixedRadix);
}

#[test]
fn test_concurrent_clones() {
    let len = 360;
    let input = ramp(len);

    let mut plan = Plan::<f64>::with_flags(len, PlanFlags::ESTIMATE).unwrap();
    let mut expected = vec![Complex::zero(); len];
    plan.forward(&mut expected, &input).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let mut plan = plan.clone();
            let input = &input;
            let expected = &expected;
            scope.spawn(move || {
                let mut output = vec![Complex::zero(); len];
                for _ in 0..50 {
                    plan.forward(&mut output, input).unwrap();
                    assert_eq!(&output, expected);

                    plan.inverse_in_place(&mut output).unwrap();
                    for (actual, original) in output.iter().zip(input.iter()) {
                        assert!((actual - original).norm() < 1e-9);
                    }
                }
            });
        }

        // the original stays usable while its clones run
        let mut output = vec![Complex::zero(); len];
        plan.forward(&mut output, &input).unwrap();
        assert_eq!(output, expected);
    });
}

#[test]
fn test_wisdom_persistence() {
    let path = std::env::temp_dir().join(format!("wisefft-test-basic-{}.wisdom", std::process::id()));

    let first_session = Arc::new(Wisdom::new());
    let planner = Planner::<f64>::with_context(
        Arc::new(CodeletRegistry::with_builtin_codelets()),
        Some(first_session.clone()),
        CpuFeatures::generic(),
    );
    let plan = Plan::with_planner(4096, &planner, PlanFlags::DEFAULT, Strategy::Dit).unwrap();
    assert_eq!(plan.strategy(), Strategy::Dit);
    let plan = Plan::with_planner(60, &planner, PlanFlags::DEFAULT, Strategy::Auto).unwrap();
    assert_eq!(plan.strategy(), Strategy::MixedRadix);
    let plan = Plan::with_planner(64, &planner, PlanFlags::DEFAULT, Strategy::Auto).unwrap();
    assert!(plan.uses_codelet());
    assert_eq!(first_session.len(), 3);
    first_session.export_file(&path).unwrap();

    let second_session = Arc::new(Wisdom::new());
    assert_eq!(second_session.import_file(&path).unwrap(), 3);
    std::fs::remove_file(&path).unwrap();

    let key = WisdomKey {
        size: 4096,
        precision: Precision::Double,
        cpu_mask: 0,
    };
    assert_eq!(second_session.lookup(&key).unwrap().algorithm, "dit_fallback");
    assert_eq!(
        second_session.lookup_algorithm(64, Precision::Double, 0).as_deref(),
        Some("dit64_radix4_generic")
    );

    // a planner in the second session adopts the recorded decision without being told
    let planner = Planner::<f64>::with_context(
        Arc::new(CodeletRegistry::with_builtin_codelets()),
        Some(second_session),
        CpuFeatures::generic(),
    );
    let plan = Plan::with_planner(4096, &planner, PlanFlags::USE_WISDOM, Strategy::Auto).unwrap();
    assert_eq!(plan.strategy(), Strategy::Dit);
}

#[test]
fn test_corrupt_wisdom_is_rejected() {
    let wisdom = Wisdom::new();
    let data = "wisefft-wisdom v1\n16 f64 0x0 stockham 0\n32 f64 0x0\n";
    assert!(wisdom.import_str(data).is_err());
    assert!(wisdom.is_empty());
}
