//! Ground-truth GEMM used to check every kernel.

use crate::sample::SampleConfig;
use gemmbench_kernels::codec;
use gemmbench_kernels::{GemmError, Result};

/// Computes `C = A·B` in `f32`, decoding every operand element through the codec.
///
/// `a` and `b` are the raw row-major operand bytes in `cfg.dtype`. The result is
/// always plain `f32`, whatever the operand encoding.
pub fn compute_reference(cfg: &SampleConfig, a: &[u8], b: &[u8]) -> Result<Vec<f32>> {
    if a.len() != cfg.a_bytes() {
        return Err(GemmError::SizeMismatch {
            what: "reference operand A",
            expected: cfg.a_bytes(),
            actual: a.len(),
        });
    }
    if b.len() != cfg.b_bytes() {
        return Err(GemmError::SizeMismatch {
            what: "reference operand B",
            expected: cfg.b_bytes(),
            actual: b.len(),
        });
    }

    let (m, n, k) = (cfg.m, cfg.n, cfg.k);
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += codec::load(a, i * k + p, cfg.dtype) * codec::load(b, p * n + j, cfg.dtype);
            }
            c[i * n + j] = sum;
        }
    }
    Ok(c)
}
