//! Tolerance-based comparison of kernel output against the reference.

use gemmbench_kernels::codec;
use gemmbench_kernels::{DataType, GemmError, MatrixBuffer, Result};
use serde::{Deserialize, Serialize};

/// Keeps the relative error finite where the expected value is exactly zero.
const REL_EPSILON: f64 = 1e-12;

/// Per-element acceptance bound: `|e - a| <= atol + rtol * |e|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationTolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Default for VerificationTolerance {
    fn default() -> Self {
        Self {
            atol: 1e-3,
            rtol: 1e-2,
        }
    }
}

impl VerificationTolerance {
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    /// Tight bounds for float32 kernels that should match almost bit for bit.
    pub fn strict() -> Self {
        Self {
            atol: 1e-5,
            rtol: 1e-4,
        }
    }
}

/// The first element that violated the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub expected: f32,
    pub actual: f32,
    pub abs_error: f64,
    pub rel_error: f64,
}

/// Outcome of one comparison.
///
/// The maxima cover every element; `mismatch` describes only the first failure,
/// which is not necessarily the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub ok: bool,
    pub max_abs_error: f64,
    pub max_rel_error: f64,
    pub mismatch: Option<Mismatch>,
}

/// Compares `m × n` reference values against `actual`, encoded as `dtype`.
///
/// An element fails when its absolute error exceeds `atol + rtol * |expected|`.
/// This is stricter than a plain `abs_err > bound` test: an element whose error
/// is NaN fails instead of slipping through the comparison. NaN against NaN and
/// equal infinities have zero error. NaN errors do not enter the maxima.
pub fn verify(
    expected: &[f32],
    actual: &[u8],
    m: usize,
    n: usize,
    dtype: DataType,
    tolerance: &VerificationTolerance,
) -> Result<VerifyResult> {
    let total = m * n;
    if total > 0 && (expected.is_empty() || actual.is_empty()) {
        return Err(GemmError::NullBuffer);
    }
    if expected.len() != total {
        return Err(GemmError::SizeMismatch {
            what: "expected values",
            expected: total * 4,
            actual: expected.len() * 4,
        });
    }
    let actual_bytes = total * dtype.element_size_bytes();
    if actual.len() != actual_bytes {
        return Err(GemmError::SizeMismatch {
            what: "actual values",
            expected: actual_bytes,
            actual: actual.len(),
        });
    }

    let mut result = VerifyResult {
        ok: true,
        max_abs_error: 0.0,
        max_rel_error: 0.0,
        mismatch: None,
    };

    for (idx, &exp_val) in expected.iter().enumerate() {
        let act_val = codec::load(actual, idx, dtype);
        let (abs_err, rel_err) = element_error(exp_val, act_val);

        result.max_abs_error = result.max_abs_error.max(abs_err);
        result.max_rel_error = result.max_rel_error.max(rel_err);

        let bound = tolerance.atol + tolerance.rtol * (exp_val as f64).abs();
        // A NaN error is never within bound.
        let within = abs_err <= bound;
        if !within && result.ok {
            result.ok = false;
            result.mismatch = Some(Mismatch {
                index: idx,
                row: idx / n,
                col: idx % n,
                expected: exp_val,
                actual: act_val,
                abs_error: abs_err,
                rel_error: rel_err,
            });
        }
    }

    Ok(result)
}

/// Compares against a kernel output buffer, taking shape and encoding from it.
pub fn verify_buffer(
    expected: &[f32],
    actual: &MatrixBuffer,
    tolerance: &VerificationTolerance,
) -> Result<VerifyResult> {
    verify(
        expected,
        actual.as_bytes(),
        actual.rows(),
        actual.cols(),
        actual.dtype(),
        tolerance,
    )
}

fn element_error(expected: f32, actual: f32) -> (f64, f64) {
    let both_nan = expected.is_nan() && actual.is_nan();
    let same_infinity = expected.is_infinite() && expected == actual;
    if both_nan || same_infinity {
        return (0.0, 0.0);
    }
    let expected = expected as f64;
    let abs_err = (expected - actual as f64).abs();
    (abs_err, abs_err / (expected.abs() + REL_EPSILON))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn encode(values: &[f32], dtype: DataType) -> Vec<u8> {
        MatrixBuffer::from_f32(1, values.len(), dtype, values)
            .unwrap()
            .into_bytes()
    }

    #[test]
    fn within_tolerance_passes() {
        let result = verify(
            &[1.0, 2.0],
            &encode(&[1.0, 2.0009], DataType::Float32),
            1,
            2,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(result.ok);
        assert!(result.mismatch.is_none());
        assert_relative_eq!(result.max_abs_error, 0.0009, max_relative = 1e-3);
    }

    #[test]
    fn reports_first_mismatch() {
        let result = verify(
            &[1.0, 2.0],
            &encode(&[1.0, 2.5], DataType::Float32),
            1,
            2,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(!result.ok);
        let mismatch = result.mismatch.unwrap();
        assert_eq!(mismatch.index, 1);
        assert_eq!((mismatch.row, mismatch.col), (0, 1));
        assert_eq!(mismatch.expected, 2.0);
        assert_eq!(mismatch.actual, 2.5);
        assert_relative_eq!(mismatch.abs_error, 0.5);
        assert_relative_eq!(mismatch.rel_error, 0.25, max_relative = 1e-9);
    }

    #[test]
    fn first_failure_is_not_the_worst() {
        // 2x2: element 1 fails slightly, element 2 fails badly.
        let expected = [1.0, 1.0, 1.0, 1.0];
        let actual = encode(&[1.0, 1.5, 9.0, 1.0], DataType::Float32);
        let result = verify(
            &expected,
            &actual,
            2,
            2,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        let mismatch = result.mismatch.unwrap();
        assert_eq!(mismatch.index, 1);
        assert_relative_eq!(mismatch.abs_error, 0.5);
        assert_relative_eq!(result.max_abs_error, 8.0);
        assert_relative_eq!(result.max_rel_error, 8.0, max_relative = 1e-9);

        let later = verify(
            &expected,
            &encode(&[1.0, 1.0, 9.0, 1.0], DataType::Float32),
            2,
            2,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap()
        .mismatch
        .unwrap();
        assert_eq!((later.row, later.col), (1, 0));
    }

    #[test]
    fn zero_expected_uses_epsilon() {
        let result = verify(
            &[0.0],
            &encode(&[1e-4], DataType::Float32),
            1,
            1,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(result.ok);
        assert!(result.max_rel_error.is_finite());
        assert!(result.max_rel_error > 1e7);
    }

    #[test]
    fn decodes_half_precision_output() {
        let result = verify(
            &[0.1, 1000.0],
            &encode(&[0.1, 1000.0], DataType::Float16),
            1,
            2,
            DataType::Float16,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(result.ok);
        assert!(result.max_abs_error > 0.0);

        let buffer = MatrixBuffer::from_f32(1, 2, DataType::BFloat16, &[3.0, 5.0]).unwrap();
        let result =
            verify_buffer(&[3.0, 5.0], &buffer, &VerificationTolerance::strict()).unwrap();
        assert!(result.ok);
        assert_eq!(result.max_abs_error, 0.0);
    }

    #[test]
    fn nan_output_fails() {
        let result = verify(
            &[1.0],
            &encode(&[f32::NAN], DataType::Float32),
            1,
            1,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(!result.ok);
        assert!(result.mismatch.unwrap().actual.is_nan());

        let matching = verify(
            &[f32::NAN, f32::INFINITY],
            &encode(&[f32::NAN, f32::INFINITY], DataType::Float32),
            1,
            2,
            DataType::Float32,
            &VerificationTolerance::default(),
        )
        .unwrap();
        assert!(matching.ok);
    }

    #[test]
    fn absent_buffers_are_rejected() {
        let tol = VerificationTolerance::default();
        assert!(matches!(
            verify(&[], &[0u8; 4], 1, 1, DataType::Float32, &tol),
            Err(GemmError::NullBuffer)
        ));
        assert!(matches!(
            verify(&[1.0], &[], 1, 1, DataType::Float32, &tol),
            Err(GemmError::NullBuffer)
        ));
        assert!(matches!(
            verify(&[1.0], &[0u8; 2], 1, 1, DataType::Float32, &tol),
            Err(GemmError::SizeMismatch { .. })
        ));
        let empty = verify(&[], &[], 0, 3, DataType::Float32, &tol).unwrap();
        assert!(empty.ok);
    }
}
