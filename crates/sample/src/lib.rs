//! GEMM samples: the versioned binary file format, the reference result and
//! deterministic operand generation.

pub mod format;
pub mod generator;
pub mod reference;
pub mod sample;
pub mod store;

pub use format::{SampleHeader, LEGACY_SAMPLE_VERSION, SAMPLE_MAGIC, SAMPLE_VERSION};
pub use generator::{generate_matrix, MatrixPattern};
pub use reference::compute_reference;
pub use sample::{Sample, SampleConfig};
pub use store::{load_sample, read_sample, save_sample, write_sample};
