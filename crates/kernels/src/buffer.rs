//! Owned row-major matrix storage in one of the element encodings.

use crate::codec;
use crate::config::DataType;
use crate::error::{GemmError, Result};
use std::io::Write;

/// A `rows × cols` row-major matrix held as raw bytes in `dtype` encoding.
///
/// The byte length always equals `rows * cols * dtype.element_size_bytes()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixBuffer {
    rows: usize,
    cols: usize,
    dtype: DataType,
    bytes: Vec<u8>,
}

impl MatrixBuffer {
    pub fn zeros(rows: usize, cols: usize, dtype: DataType) -> Self {
        Self {
            rows,
            cols,
            dtype,
            bytes: vec![0u8; rows * cols * dtype.element_size_bytes()],
        }
    }

    /// Wraps existing encoded bytes, checking their length against the shape.
    pub fn from_bytes(rows: usize, cols: usize, dtype: DataType, bytes: Vec<u8>) -> Result<Self> {
        let expected = rows * cols * dtype.element_size_bytes();
        if bytes.len() != expected {
            return Err(GemmError::SizeMismatch {
                what: "matrix buffer",
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            dtype,
            bytes,
        })
    }

    /// Encodes `values` (row-major) into a new buffer.
    pub fn from_f32(rows: usize, cols: usize, dtype: DataType, values: &[f32]) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(GemmError::SizeMismatch {
                what: "matrix values",
                expected: rows * cols * 4,
                actual: values.len() * 4,
            });
        }
        let mut buffer = Self::zeros(rows, cols, dtype);
        for (idx, &value) in values.iter().enumerate() {
            buffer.store(idx, value);
        }
        Ok(buffer)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decodes the element at flat index `idx`.
    #[inline]
    pub fn load(&self, idx: usize) -> f32 {
        codec::load(&self.bytes, idx, self.dtype)
    }

    #[inline]
    pub fn store(&mut self, idx: usize, value: f32) {
        codec::store(&mut self.bytes, idx, self.dtype, value)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.load(row * self.cols + col)
    }

    pub fn fill(&mut self, value: f32) {
        for idx in 0..self.len() {
            self.store(idx, value);
        }
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        (0..self.len()).map(|idx| self.load(idx)).collect()
    }

    /// Writes the decoded matrix row by row, one line per row.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        write_matrix(out, &self.to_f32_vec(), self.rows, self.cols)
    }
}

/// Writes `rows × cols` row-major `values` as space-separated lines.
pub fn write_matrix<W: Write>(
    out: &mut W,
    values: &[f32],
    rows: usize,
    cols: usize,
) -> Result<()> {
    let expected = rows.checked_mul(cols).unwrap_or(usize::MAX);
    if values.len() != expected {
        return Err(GemmError::SizeMismatch {
            what: "printed matrix",
            expected: expected.saturating_mul(4),
            actual: values.len() * 4,
        });
    }
    if cols == 0 {
        return Ok(());
    }
    for row in values.chunks(cols) {
        let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}
