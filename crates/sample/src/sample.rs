//! In-memory GEMM samples.

use crate::generator::{generate_matrix, MatrixPattern};
use crate::reference::compute_reference;
use gemmbench_kernels::{GemmError, GemmProblem, MatrixBuffer, Result};

/// Dimensions and operand encoding of a sample.
pub type SampleConfig = GemmProblem;

pub const SEED_A: u64 = 42;
pub const SEED_B: u64 = 1337;

/// A persisted problem instance: operands `A` (m×k), `B` (k×n) in `cfg.dtype`
/// and the `f32` reference result `C` (m×n).
#[derive(Debug, Clone)]
pub struct Sample {
    cfg: SampleConfig,
    a: MatrixBuffer,
    b: MatrixBuffer,
    c: Vec<f32>,
}

impl Sample {
    /// Assembles a sample from raw parts, rejecting any length that disagrees with `cfg`.
    pub fn new(cfg: SampleConfig, a: Vec<u8>, b: Vec<u8>, c: Vec<f32>) -> Result<Self> {
        cfg.validate()?;
        let a = MatrixBuffer::from_bytes(cfg.m, cfg.k, cfg.dtype, a)?;
        let b = MatrixBuffer::from_bytes(cfg.k, cfg.n, cfg.dtype, b)?;
        if c.len() != cfg.c_elements() {
            return Err(GemmError::SizeMismatch {
                what: "reference result C",
                expected: cfg.c_elements() * 4,
                actual: c.len() * 4,
            });
        }
        Ok(Self { cfg, a, b, c })
    }

    /// Builds a sample from operand buffers, computing the reference result.
    pub fn from_operands(cfg: SampleConfig, a: MatrixBuffer, b: MatrixBuffer) -> Result<Self> {
        let c = compute_reference(&cfg, a.as_bytes(), b.as_bytes())?;
        Self::new(cfg, a.into_bytes(), b.into_bytes(), c)
    }

    /// Deterministically generated operands plus their reference result.
    pub fn generate(cfg: SampleConfig, pattern: MatrixPattern) -> Result<Self> {
        cfg.validate()?;
        let a = generate_matrix(cfg.m, cfg.k, cfg.dtype, SEED_A, pattern);
        let b = generate_matrix(cfg.k, cfg.n, cfg.dtype, SEED_B, pattern);
        Self::from_operands(cfg, a, b)
    }

    pub fn cfg(&self) -> &SampleConfig {
        &self.cfg
    }

    pub fn a(&self) -> &MatrixBuffer {
        &self.a
    }

    pub fn b(&self) -> &MatrixBuffer {
        &self.b
    }

    pub fn c(&self) -> &[f32] {
        &self.c
    }
}
