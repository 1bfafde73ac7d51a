//! Benchmark harness and verification engine for gemmbench.

pub mod bench;
pub mod report;
pub mod verify;

pub use bench::{measure, BenchResult, WARMUP_RUNS};
pub use report::RunReport;
pub use verify::{verify, verify_buffer, Mismatch, VerificationTolerance, VerifyResult};
