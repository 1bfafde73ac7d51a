//! Shared helpers for kernel implementations.

use crate::buffer::MatrixBuffer;
use crate::config::GemmProblem;
use anyhow::{bail, Result};
use ndarray::Array2;

/// Checks operand shapes and encodings against `problem`.
pub fn validate_gemm_operands(
    problem: &GemmProblem,
    a: &MatrixBuffer,
    b: &MatrixBuffer,
    c: &MatrixBuffer,
) -> Result<()> {
    if a.dtype() != problem.dtype || b.dtype() != problem.dtype {
        bail!(
            "operand dtype mismatch: problem {} vs a {} / b {}",
            problem.dtype,
            a.dtype(),
            b.dtype()
        );
    }
    if (a.rows(), a.cols()) != (problem.m, problem.k) {
        bail!(
            "lhs shape {}x{} does not match m={} k={}",
            a.rows(),
            a.cols(),
            problem.m,
            problem.k
        );
    }
    if (b.rows(), b.cols()) != (problem.k, problem.n) {
        bail!(
            "rhs shape {}x{} does not match k={} n={}",
            b.rows(),
            b.cols(),
            problem.k,
            problem.n
        );
    }
    if (c.rows(), c.cols()) != (problem.m, problem.n) {
        bail!(
            "output shape {}x{} does not match m={} n={}",
            c.rows(),
            c.cols(),
            problem.m,
            problem.n
        );
    }
    Ok(())
}

/// Decodes a buffer into a dense `f32` array.
pub fn decode_to_array(buffer: &MatrixBuffer) -> Array2<f32> {
    Array2::from_shape_fn((buffer.rows(), buffer.cols()), |(i, j)| buffer.get(i, j))
}

/// Encodes `values` into `out`, which must have the same shape.
pub fn encode_from_array(values: &Array2<f32>, out: &mut MatrixBuffer) {
    let cols = out.cols();
    for ((i, j), &value) in values.indexed_iter() {
        out.store(i * cols + j, value);
    }
}
