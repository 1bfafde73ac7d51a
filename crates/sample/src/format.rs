//! On-disk layout of sample files.
//!
//! All fields are little-endian `u32`:
//!
//! ```text
//! magic | version | M | N | K | dtype_tag (version 2 only) | A | B | C (M*N f32)
//! ```
//!
//! Version 1 files carry no dtype tag and always hold `float32` operands.

use crate::sample::SampleConfig;
use gemmbench_kernels::{DataType, GemmError, Result};
use std::io::{self, Read};

/// "GSMM" read as a little-endian `u32`.
pub const SAMPLE_MAGIC: u32 = 0x4753_4D4D;
pub const SAMPLE_VERSION: u32 = 2;
pub const LEGACY_SAMPLE_VERSION: u32 = 1;

const BASE_HEADER_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleHeader {
    pub version: u32,
    pub m: u32,
    pub n: u32,
    pub k: u32,
    pub dtype: DataType,
}

impl SampleHeader {
    /// Current-version header for `cfg`.
    pub fn for_config(cfg: &SampleConfig) -> Result<Self> {
        let dim = |value: usize, name: &str| {
            u32::try_from(value).map_err(|_| {
                GemmError::InvalidArgument(format!("dimension {name}={value} does not fit in u32"))
            })
        };
        Ok(Self {
            version: SAMPLE_VERSION,
            m: dim(cfg.m, "M")?,
            n: dim(cfg.n, "N")?,
            k: dim(cfg.k, "K")?,
            dtype: cfg.dtype,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BASE_HEADER_LEN + 4);
        for field in [SAMPLE_MAGIC, self.version, self.m, self.n, self.k] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        if self.version >= SAMPLE_VERSION {
            out.extend_from_slice(&self.dtype.tag().to_le_bytes());
        }
        out
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut base = [0u8; BASE_HEADER_LEN];
        read_exact_or(reader, &mut base, || {
            GemmError::CorruptFile("incomplete sample header".to_string())
        })?;

        let field = |idx: usize| {
            let offset = idx * 4;
            u32::from_le_bytes([
                base[offset],
                base[offset + 1],
                base[offset + 2],
                base[offset + 3],
            ])
        };
        let magic = field(0);
        if magic != SAMPLE_MAGIC {
            return Err(GemmError::CorruptFile(format!(
                "bad magic {magic:#010x}, expected {SAMPLE_MAGIC:#010x}"
            )));
        }

        let version = field(1);
        let dtype = match version {
            LEGACY_SAMPLE_VERSION => DataType::Float32,
            SAMPLE_VERSION => {
                let mut tag = [0u8; 4];
                read_exact_or(reader, &mut tag, || {
                    GemmError::CorruptFile("sample file is missing its dtype tag".to_string())
                })?;
                let tag = u32::from_le_bytes(tag);
                DataType::from_tag(tag).ok_or_else(|| {
                    GemmError::CorruptFile(format!("unsupported dtype tag {tag}"))
                })?
            }
            other => {
                return Err(GemmError::CorruptFile(format!(
                    "unsupported sample file version {other}"
                )))
            }
        };

        Ok(Self {
            version,
            m: field(2),
            n: field(3),
            k: field(4),
            dtype,
        })
    }

    /// Problem described by the header.
    pub fn config(&self) -> Result<SampleConfig> {
        if self.m == 0 || self.n == 0 || self.k == 0 {
            return Err(GemmError::CorruptFile(format!(
                "zero dimension in header: M={} N={} K={}",
                self.m, self.n, self.k
            )));
        }
        Ok(SampleConfig::new(
            self.m as usize,
            self.n as usize,
            self.k as usize,
            self.dtype,
        ))
    }

    /// Byte sizes of the A, B and C sections.
    pub fn section_sizes(&self) -> Result<(usize, usize, usize)> {
        let width = self.dtype.element_size_bytes();
        let bytes = |rows: u32, cols: u32, width: usize| {
            (rows as usize)
                .checked_mul(cols as usize)
                .and_then(|elems| elems.checked_mul(width))
                .ok_or_else(|| {
                    GemmError::CorruptFile(format!(
                        "section {rows}x{cols} overflows addressable memory"
                    ))
                })
        };
        Ok((
            bytes(self.m, self.k, width)?,
            bytes(self.k, self.n, width)?,
            bytes(self.m, self.n, 4)?,
        ))
    }
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    on_eof: impl FnOnce() -> GemmError,
) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(on_eof()),
        Err(err) => Err(err.into()),
    }
}
