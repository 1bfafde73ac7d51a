//! Element codec, typed matrix buffers and GEMM kernels for gemmbench.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod gemm;
pub mod registry;
pub mod utils;

pub use buffer::*;
pub use config::*;
pub use error::*;
pub use gemm::*;
pub use registry::*;
