//! Kernel timing.

use anyhow::Result;
use gemmbench_kernels::{GemmKernel, GemmProblem, MatrixBuffer};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Untimed runs before the measured one.
pub const WARMUP_RUNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub elapsed_ms: f64,
}

impl BenchResult {
    pub fn gflops(&self, problem: &GemmProblem) -> f64 {
        if self.elapsed_ms > 0.0 {
            problem.flops() / (self.elapsed_ms * 1.0e6)
        } else {
            0.0
        }
    }
}

/// Runs `kernel` [`WARMUP_RUNS`] times, then times one more run.
///
/// `c` is not cleared between runs. Kernel errors are returned as-is.
pub fn measure(
    kernel: &mut dyn GemmKernel,
    problem: &GemmProblem,
    a: &MatrixBuffer,
    b: &MatrixBuffer,
    c: &mut MatrixBuffer,
) -> Result<BenchResult> {
    for _ in 0..WARMUP_RUNS {
        kernel.run(problem, a, b, c)?;
    }

    let start = Instant::now();
    kernel.run(problem, a, b, c)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    debug!(
        kernel = kernel.name(),
        m = problem.m,
        n = problem.n,
        k = problem.k,
        elapsed_ms,
        "measured gemm run"
    );
    Ok(BenchResult { elapsed_ms })
}
