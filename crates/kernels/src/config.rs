//! Element encodings and GEMM problem descriptions.

use crate::error::{GemmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage encoding of a matrix element.
///
/// The discriminants double as the on-disk dtype tag of the sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32 = 0,
    Float16 = 1,
    BFloat16 = 2,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Float32, DataType::Float16, DataType::BFloat16];

    /// Bytes occupied by one element.
    pub const fn element_size_bytes(self) -> usize {
        match self {
            DataType::Float32 => 4,
            DataType::Float16 | DataType::BFloat16 => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DataType::Float32 => "float32",
            DataType::Float16 => "float16",
            DataType::BFloat16 => "bfloat16",
        }
    }

    pub const fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(DataType::Float32),
            1 => Some(DataType::Float16),
            2 => Some(DataType::BFloat16),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = GemmError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "float32" | "fp32" | "f32" => Ok(DataType::Float32),
            "float16" | "fp16" | "f16" | "half" => Ok(DataType::Float16),
            "bfloat16" | "bf16" => Ok(DataType::BFloat16),
            _ => Err(GemmError::InvalidArgument(format!(
                "unsupported dtype: {value}"
            ))),
        }
    }
}

/// Dimensions and operand encoding of one `C = A·B` problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GemmProblem {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub dtype: DataType,
}

impl GemmProblem {
    pub fn new(m: usize, n: usize, k: usize, dtype: DataType) -> Self {
        Self { m, n, k, dtype }
    }

    /// Rejects problems with a zero dimension, a dimension that does not fit
    /// in `u32`, or operand sizes that overflow `usize`.
    pub fn validate(&self) -> Result<()> {
        if self.m == 0 || self.n == 0 || self.k == 0 {
            return Err(GemmError::InvalidArgument(format!(
                "GEMM dimensions must be positive, got m={} n={} k={}",
                self.m, self.n, self.k
            )));
        }
        for (label, dim) in [("m", self.m), ("n", self.n), ("k", self.k)] {
            if u32::try_from(dim).is_err() {
                return Err(GemmError::InvalidArgument(format!(
                    "dimension {label}={dim} exceeds {}",
                    u32::MAX
                )));
            }
        }
        let width = self.dtype.element_size_bytes();
        let sections = [
            ("A", self.m, self.k, width),
            ("B", self.k, self.n, width),
            ("C", self.m, self.n, std::mem::size_of::<f32>()),
        ];
        for (label, rows, cols, width) in sections {
            if rows
                .checked_mul(cols)
                .and_then(|elements| elements.checked_mul(width))
                .is_none()
            {
                return Err(GemmError::InvalidArgument(format!(
                    "matrix {label} of {rows}x{cols} overflows the addressable size"
                )));
            }
        }
        Ok(())
    }

    pub fn a_bytes(&self) -> usize {
        self.m * self.k * self.dtype.element_size_bytes()
    }

    pub fn b_bytes(&self) -> usize {
        self.k * self.n * self.dtype.element_size_bytes()
    }

    pub fn c_elements(&self) -> usize {
        self.m * self.n
    }

    pub fn flops(&self) -> f64 {
        2.0 * self.m as f64 * self.n as f64 * self.k as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    pub tile_m: usize,
    pub tile_n: usize,
    pub tile_k: usize,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_m: 64,
            tile_n: 64,
            tile_k: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("FP16".parse::<DataType>().unwrap(), DataType::Float16);
        assert_eq!("half".parse::<DataType>().unwrap(), DataType::Float16);
        assert_eq!("BF16".parse::<DataType>().unwrap(), DataType::BFloat16);
        assert_eq!("Float32".parse::<DataType>().unwrap(), DataType::Float32);
        assert!(matches!(
            "int8".parse::<DataType>(),
            Err(GemmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn widths_and_tags_are_fixed() {
        assert_eq!(DataType::Float32.element_size_bytes(), 4);
        assert_eq!(DataType::Float16.element_size_bytes(), 2);
        assert_eq!(DataType::BFloat16.element_size_bytes(), 2);
        for dtype in DataType::ALL {
            assert_eq!(DataType::from_tag(dtype.tag()), Some(dtype));
            assert_eq!(dtype.to_string().parse::<DataType>().unwrap(), dtype);
        }
        assert_eq!(DataType::from_tag(3), None);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(GemmProblem::new(2, 0, 2, DataType::Float32).validate().is_err());
        let problem = GemmProblem::new(2, 3, 4, DataType::Float16);
        assert!(problem.validate().is_ok());
        assert_eq!(problem.a_bytes(), 16);
        assert_eq!(problem.b_bytes(), 24);
        assert_eq!(problem.c_elements(), 6);
        assert_eq!(problem.flops(), 48.0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_dimensions_are_rejected() {
        let too_wide = u32::MAX as usize + 1;
        let problem = GemmProblem::new(too_wide, 1, too_wide, DataType::Float32);
        assert!(matches!(problem.validate(), Err(GemmError::InvalidArgument(_))));

        let max = u32::MAX as usize;
        let problem = GemmProblem::new(max, 1, max, DataType::Float32);
        assert!(matches!(problem.validate(), Err(GemmError::InvalidArgument(_))));

        assert!(GemmProblem::new(max, 1, 1, DataType::BFloat16).validate().is_ok());
    }
}
