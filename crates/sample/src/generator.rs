//! Deterministic operand generation.

use gemmbench_kernels::{DataType, GemmError, MatrixBuffer};
use std::fmt;
use std::str::FromStr;

/// Value pattern used to fill a generated matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixPattern {
    /// Uniform in [-1, 1).
    #[default]
    Random,
    /// `(idx % 16) / 8 - 1`, exact in every encoding.
    Sequential,
    Ones,
    Zeros,
}

impl FromStr for MatrixPattern {
    type Err = GemmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "random" => Ok(MatrixPattern::Random),
            "sequential" => Ok(MatrixPattern::Sequential),
            "ones" => Ok(MatrixPattern::Ones),
            "zeros" => Ok(MatrixPattern::Zeros),
            _ => Err(GemmError::InvalidArgument(format!(
                "unknown matrix pattern: {value}"
            ))),
        }
    }
}

impl fmt::Display for MatrixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatrixPattern::Random => "random",
            MatrixPattern::Sequential => "sequential",
            MatrixPattern::Ones => "ones",
            MatrixPattern::Zeros => "zeros",
        };
        f.write_str(name)
    }
}

/// Fills a `rows × cols` matrix in `dtype`; the same seed always yields the same bytes.
pub fn generate_matrix(
    rows: usize,
    cols: usize,
    dtype: DataType,
    seed: u64,
    pattern: MatrixPattern,
) -> MatrixBuffer {
    let mut buffer = MatrixBuffer::zeros(rows, cols, dtype);
    let mut rng = fastrand::Rng::with_seed(seed);
    for idx in 0..buffer.len() {
        let value = match pattern {
            MatrixPattern::Random => rng.f32() * 2.0 - 1.0,
            MatrixPattern::Sequential => (idx % 16) as f32 / 8.0 - 1.0,
            MatrixPattern::Ones => 1.0,
            MatrixPattern::Zeros => 0.0,
        };
        buffer.store(idx, value);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let first = generate_matrix(8, 8, DataType::BFloat16, 7, MatrixPattern::Random);
        let second = generate_matrix(8, 8, DataType::BFloat16, 7, MatrixPattern::Random);
        let other = generate_matrix(8, 8, DataType::BFloat16, 8, MatrixPattern::Random);
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn random_values_stay_in_range() {
        let buffer = generate_matrix(16, 16, DataType::Float32, 42, MatrixPattern::Random);
        assert!(buffer.to_f32_vec().iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn sequential_is_exact_in_half_precision() {
        let buffer = generate_matrix(2, 10, DataType::Float16, 0, MatrixPattern::Sequential);
        let values = buffer.to_f32_vec();
        assert_eq!(values[0], -1.0);
        assert_eq!(values[8], 0.0);
        assert_eq!(values[15], 0.875);
        assert_eq!(values[16], -1.0);
    }

    #[test]
    fn parses_pattern_names() {
        assert_eq!("ONES".parse::<MatrixPattern>().unwrap(), MatrixPattern::Ones);
        assert_eq!("Sequential".parse::<MatrixPattern>().unwrap(), MatrixPattern::Sequential);
        assert!("custom".parse::<MatrixPattern>().is_err());
    }
}
