//! Error types shared by the codec, buffers, registry and sample store.

use thiserror::Error;

/// Errors raised by the GEMM benchmarking core.
#[derive(Debug, Error)]
pub enum GemmError {
    /// An argument could not be interpreted (unknown dtype name, zero dimension).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A buffer length disagrees with the dimensions it claims to hold.
    #[error("size mismatch for {what}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Bad magic, unsupported version or unreadable dtype tag.
    #[error("corrupt sample file: {0}")]
    CorruptFile(String),

    /// A declared section has fewer bytes than required.
    #[error("sample file is truncated: {0}")]
    TruncatedFile(String),

    /// No kernel registered under this name.
    #[error("kernel not found: {0}")]
    NotFound(String),

    /// A non-empty comparison was requested against an absent buffer.
    #[error("null matrix buffer provided for verification")]
    NullBuffer,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for the GEMM benchmarking core.
pub type Result<T> = std::result::Result<T, GemmError>;
