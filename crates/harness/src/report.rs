//! Machine-readable summary of one benchmark run.

use crate::bench::BenchResult;
use crate::verify::{Mismatch, VerifyResult};
use gemmbench_kernels::{DataType, GemmProblem};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub op: String,
    #[serde(rename = "M")]
    pub m: usize,
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "K")]
    pub k: usize,
    pub dtype: DataType,
    pub time_ms: f64,
    pub gflops: f64,
    pub verified: bool,
    pub max_abs_error: f64,
    pub max_rel_error: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mismatch: Option<Mismatch>,
}

impl RunReport {
    pub fn new(
        op: &str,
        problem: &GemmProblem,
        bench: &BenchResult,
        verification: &VerifyResult,
    ) -> Self {
        Self {
            op: op.to_string(),
            m: problem.m,
            n: problem.n,
            k: problem.k,
            dtype: problem.dtype,
            time_ms: bench.elapsed_ms,
            gflops: bench.gflops(problem),
            verified: verification.ok,
            max_abs_error: verification.max_abs_error,
            max_rel_error: verification.max_rel_error,
            mismatch: verification.mismatch,
        }
    }

    /// Save report to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}
