//! End-to-end tests for specialized transforms.
//!
//! Each test specializes a transform, compiles the generated source with the
//! interpreting backend and checks the output against a direct evaluation of
//! the DFT definition.

use std::f64::consts::PI;

use fftgen::backend::Interpreter;
use fftgen::driver::{specialize_transform, specialize_transform_with, BindingMode, SpecializeOptions};
use fftgen::SpecializeError;

/// `X[k] = sum_n x[n] * exp(-2*pi*i*k*n/N)` over interleaved data.
fn naive_dft(data: &[f64]) -> Vec<f64> {
    let n = data.len() / 2;
    let mut out = vec![0.0; data.len()];
    for k in 0..n {
        let (mut re, mut im) = (0.0, 0.0);
        for j in 0..n {
            let angle = -2.0 * PI * (k * j) as f64 / n as f64;
            let (x, y) = (data[2 * j], data[2 * j + 1]);
            re += x * angle.cos() - y * angle.sin();
            im += x * angle.sin() + y * angle.cos();
        }
        out[2 * k] = re;
        out[2 * k + 1] = im;
    }
    out
}

fn ramp(len: usize) -> Vec<f64> {
    (0..len).map(|i| ((i * 7 + 3) % 11) as f64 - 5.0).collect()
}

fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tolerance, "value {} differs: {} vs {}", i, a, e);
    }
}

fn run(size: usize, options: &SpecializeOptions, input: &[f64]) -> Vec<f64> {
    let artifact = specialize_transform_with(size, options).unwrap();
    let transform = artifact.compile(&Interpreter::new()).unwrap();
    transform.call(input).unwrap()
}

#[test]
fn test_size_four_is_exact() {
    let _ = env_logger::builder().is_test(true).try_init();

    let artifact = specialize_transform(4).unwrap();
    let transform = artifact.compile(&Interpreter::new()).unwrap();
    let out = transform.call(&[1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 0.0]).unwrap();

    assert_eq!(out, vec![6.0, 0.0, -1.0, 1.0, 0.0, 0.0, -1.0, -1.0]);
}

#[test]
fn test_matches_dft_definition() {
    let _ = env_logger::builder().is_test(true).try_init();

    for size in [1, 2, 4, 8, 16, 32] {
        let input = ramp(2 * size);
        let out = run(size, &SpecializeOptions::default(), &input);
        assert_eq!(out.len(), 2 * size);
        assert_close(&out, &naive_dft(&input), 1e-9);
    }
}

#[test]
fn test_non_power_of_two_sizes_are_rejected() {
    for size in [0, 3, 5, 6, 7, 12, 100] {
        assert_eq!(specialize_transform(size).unwrap_err(), SpecializeError::NotPowerOfTwo { size });
    }
}

#[test]
fn test_unoptimized_schedule_is_longer_and_agrees() {
    let _ = env_logger::builder().is_test(true).try_init();

    for size in [2, 4, 8, 16] {
        let optimized = specialize_transform(size).unwrap();
        let unoptimized = specialize_transform_with(size, &SpecializeOptions::unoptimized()).unwrap();
        assert!(
            unoptimized.schedule_len >= optimized.schedule_len,
            "size {}: {} < {}",
            size,
            unoptimized.schedule_len,
            optimized.schedule_len
        );

        let input = ramp(2 * size);
        let fast = optimized.compile(&Interpreter::new()).unwrap().call(&input).unwrap();
        let slow = unoptimized.compile(&Interpreter::new()).unwrap().call(&input).unwrap();
        assert_close(&fast, &slow, 1e-9);
    }
}

#[test]
fn test_each_optimization_alone_agrees() {
    let input = ramp(16);
    let expected = naive_dft(&input);
    let variants = [
        SpecializeOptions::default().with_interning(false),
        SpecializeOptions::default().with_simplify(false),
        SpecializeOptions::default().with_dce(false),
        SpecializeOptions::unoptimized().with_dce(true),
    ];
    for options in &variants {
        assert_close(&run(8, options, &input), &expected, 1e-9);
    }
}

#[test]
fn test_results_binding_agrees_with_in_place() {
    let input = ramp(16);
    let in_place = run(8, &SpecializeOptions::default(), &input);
    let results = run(8, &SpecializeOptions::default().with_binding(BindingMode::Results), &input);
    assert_eq!(in_place, results);

    let artifact =
        specialize_transform_with(8, &SpecializeOptions::default().with_binding(BindingMode::Results)).unwrap();
    assert!(artifact.source.contains("let mut out = vec![0.0_f64; 16];"));
    assert!(!artifact.source.contains("    data["));
    assert_eq!(artifact.stats.writes_logged, 0);
}

#[test]
fn test_trigonometry_is_folded() {
    let optimized = specialize_transform(16).unwrap();
    assert!(!optimized.source.contains("f64::cos"));
    assert!(!optimized.source.contains("f64::sin"));

    let raw = specialize_transform_with(16, &SpecializeOptions::default().with_simplify(false)).unwrap();
    assert!(raw.source.contains("f64::cos"));
}

#[test]
fn test_writes_follow_all_reads_of_their_cell() {
    let artifact = specialize_transform(8).unwrap();
    let lines: Vec<&str> = artifact.source.lines().map(str::trim).collect();

    let mut last_store = None;
    for cell in 0..artifact.array_len() {
        let load = format!(" = data[{}];", cell);
        let store = format!("data[{}] = ", cell);
        let store_at = lines.iter().position(|l| l.starts_with(&store)).unwrap();
        let last_load = lines.iter().rposition(|l| l.ends_with(&load)).unwrap();
        assert!(last_load < store_at, "cell {} is read after it is overwritten", cell);

        // Stores appear in the order they were staged.
        if let Some(previous) = last_store {
            assert!(previous < store_at);
        }
        last_store = Some(store_at);
    }
}

#[test]
fn test_wrong_input_length() {
    let transform = specialize_transform(4).unwrap().compile(&Interpreter::new()).unwrap();
    assert_eq!(transform.input_len(), 8);
    assert_eq!(
        transform.call(&[1.0; 6]).unwrap_err(),
        SpecializeError::LengthMismatch { expected: 8, actual: 6 }
    );
}
