//! GEMM kernel interface and the built-in kernels.

use crate::buffer::MatrixBuffer;
use crate::config::{DataType, GemmProblem, TilingConfig};
use crate::utils::{decode_to_array, encode_from_array, validate_gemm_operands};
use anyhow::Result;
use ndarray::{s, Array2, Axis};

/// A GEMM implementation that computes `C = A·B`.
///
/// `run` writes all `m * n` elements of `c` in `c`'s own encoding and
/// touches nothing else. Errors are the kernel's own and are never
/// reinterpreted by the registry or harness.
pub trait GemmKernel: Send {
    fn name(&self) -> &'static str;

    fn supports_dtype(&self, dtype: DataType) -> bool {
        dtype == DataType::Float32
    }

    fn run(
        &mut self,
        problem: &GemmProblem,
        a: &MatrixBuffer,
        b: &MatrixBuffer,
        c: &mut MatrixBuffer,
    ) -> Result<()>;
}

pub type DynGemmKernel = Box<dyn GemmKernel>;

/// Textbook triple loop through the element codec.
#[derive(Debug, Default)]
pub struct NaiveGemm;

impl NaiveGemm {
    pub fn new() -> Self {
        Self
    }
}

impl GemmKernel for NaiveGemm {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn supports_dtype(&self, _dtype: DataType) -> bool {
        true
    }

    fn run(
        &mut self,
        problem: &GemmProblem,
        a: &MatrixBuffer,
        b: &MatrixBuffer,
        c: &mut MatrixBuffer,
    ) -> Result<()> {
        validate_gemm_operands(problem, a, b, c)?;

        let (m, n, k) = (problem.m, problem.n, problem.k);
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f32;
                for p in 0..k {
                    sum += a.load(i * k + p) * b.load(p * n + j);
                }
                c.store(i * n + j, sum);
            }
        }
        Ok(())
    }
}

/// Cache-blocked loop over decoded operands.
#[derive(Debug)]
pub struct BlockedGemm {
    config: TilingConfig,
}

impl BlockedGemm {
    pub fn new() -> Self {
        Self {
            config: TilingConfig::default(),
        }
    }

    pub fn config(&self) -> TilingConfig {
        self.config
    }

    pub fn set_config(&mut self, config: TilingConfig) {
        self.config = config;
    }
}

impl Default for BlockedGemm {
    fn default() -> Self {
        Self::new()
    }
}

impl GemmKernel for BlockedGemm {
    fn name(&self) -> &'static str {
        "blocked"
    }

    fn run(
        &mut self,
        problem: &GemmProblem,
        a: &MatrixBuffer,
        b: &MatrixBuffer,
        c: &mut MatrixBuffer,
    ) -> Result<()> {
        validate_gemm_operands(problem, a, b, c)?;

        let lhs = decode_to_array(a);
        let rhs = decode_to_array(b);
        let mut output = Array2::<f32>::zeros((problem.m, problem.n));

        let (m, n, k) = (problem.m, problem.n, problem.k);
        let tm = self.config.tile_m.max(1);
        let tn = self.config.tile_n.max(1);
        let tk = self.config.tile_k.max(1);

        for i0 in (0..m).step_by(tm) {
            let i_max = (i0 + tm).min(m);
            for j0 in (0..n).step_by(tn) {
                let j_max = (j0 + tn).min(n);
                for p0 in (0..k).step_by(tk) {
                    let p_max = (p0 + tk).min(k);
                    let a_block = lhs.slice(s![i0..i_max, p0..p_max]);
                    let b_block = rhs.slice(s![p0..p_max, j0..j_max]);
                    let mut c_block = output.slice_mut(s![i0..i_max, j0..j_max]);

                    for (row_idx, a_row) in a_block.outer_iter().enumerate() {
                        for (col_idx, b_col) in b_block.axis_iter(Axis(1)).enumerate() {
                            c_block[(row_idx, col_idx)] += a_row.dot(&b_col);
                        }
                    }
                }
            }
        }

        encode_from_array(&output, c);
        Ok(())
    }
}

/// Decodes both operands and defers to `ndarray`'s matrix product.
#[derive(Debug, Default)]
pub struct NdarrayGemm;

impl NdarrayGemm {
    pub fn new() -> Self {
        Self
    }
}

impl GemmKernel for NdarrayGemm {
    fn name(&self) -> &'static str {
        "ndarray"
    }

    fn supports_dtype(&self, _dtype: DataType) -> bool {
        true
    }

    fn run(
        &mut self,
        problem: &GemmProblem,
        a: &MatrixBuffer,
        b: &MatrixBuffer,
        c: &mut MatrixBuffer,
    ) -> Result<()> {
        validate_gemm_operands(problem, a, b, c)?;
        let output = decode_to_array(a).dot(&decode_to_array(b));
        encode_from_array(&output, c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn operands(problem: &GemmProblem) -> (MatrixBuffer, MatrixBuffer) {
        let a_values: Vec<f32> = (0..problem.m * problem.k)
            .map(|idx| ((idx % 7) as f32 - 3.0) * 0.25)
            .collect();
        let b_values: Vec<f32> = (0..problem.k * problem.n)
            .map(|idx| ((idx % 5) as f32 - 2.0) * 0.5)
            .collect();
        (
            MatrixBuffer::from_f32(problem.m, problem.k, problem.dtype, &a_values).unwrap(),
            MatrixBuffer::from_f32(problem.k, problem.n, problem.dtype, &b_values).unwrap(),
        )
    }

    #[test]
    fn naive_two_by_two() {
        let problem = GemmProblem::new(2, 2, 2, DataType::Float32);
        let a = MatrixBuffer::from_f32(2, 2, DataType::Float32, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = MatrixBuffer::from_f32(2, 2, DataType::Float32, &[5.0, 6.0, 7.0, 8.0]).unwrap();
        let mut c = MatrixBuffer::zeros(2, 2, DataType::Float32);
        NaiveGemm::new().run(&problem, &a, &b, &mut c).unwrap();
        assert_eq!(c.to_f32_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn blocked_matches_naive_on_ragged_tiles() {
        let problem = GemmProblem::new(37, 29, 41, DataType::Float32);
        let (a, b) = operands(&problem);
        let mut expected = MatrixBuffer::zeros(problem.m, problem.n, DataType::Float32);
        NaiveGemm::new().run(&problem, &a, &b, &mut expected).unwrap();

        let mut blocked = BlockedGemm::new();
        assert_eq!(blocked.config(), TilingConfig::default());
        let tiling = TilingConfig {
            tile_m: 8,
            tile_n: 16,
            tile_k: 5,
        };
        blocked.set_config(tiling);
        assert_eq!(blocked.config(), tiling);
        let mut actual = MatrixBuffer::zeros(problem.m, problem.n, DataType::Float32);
        blocked.run(&problem, &a, &b, &mut actual).unwrap();

        for (e, a) in expected.to_f32_vec().iter().zip(actual.to_f32_vec()) {
            assert_abs_diff_eq!(*e, a, epsilon = 1e-4);
        }
    }

    #[test]
    fn ndarray_matches_naive_for_every_dtype() {
        for dtype in DataType::ALL {
            let problem = GemmProblem::new(9, 6, 11, dtype);
            let (a, b) = operands(&problem);
            let mut expected = MatrixBuffer::zeros(problem.m, problem.n, DataType::Float32);
            let mut actual = MatrixBuffer::zeros(problem.m, problem.n, DataType::Float32);
            NaiveGemm::new().run(&problem, &a, &b, &mut expected).unwrap();
            NdarrayGemm::new().run(&problem, &a, &b, &mut actual).unwrap();
            for (e, a) in expected.to_f32_vec().iter().zip(actual.to_f32_vec()) {
                assert_abs_diff_eq!(*e, a, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn default_capability_is_float32_only() {
        let blocked = BlockedGemm::new();
        assert!(blocked.supports_dtype(DataType::Float32));
        assert!(!blocked.supports_dtype(DataType::Float16));
        assert!(!blocked.supports_dtype(DataType::BFloat16));
        assert!(NaiveGemm::new().supports_dtype(DataType::BFloat16));
    }

    #[test]
    fn rejects_mismatched_operands() {
        let problem = GemmProblem::new(2, 2, 3, DataType::Float32);
        let a = MatrixBuffer::zeros(2, 2, DataType::Float32);
        let b = MatrixBuffer::zeros(3, 2, DataType::Float32);
        let mut c = MatrixBuffer::zeros(2, 2, DataType::Float32);
        assert!(NaiveGemm::new().run(&problem, &a, &b, &mut c).is_err());
    }
}
