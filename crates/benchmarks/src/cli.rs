//! CLI wiring for the gemmbench driver.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gemmbench_harness::{measure, verify_buffer, RunReport, VerificationTolerance};
use gemmbench_kernels::{write_matrix, DataType, KernelRegistry, MatrixBuffer};
use gemmbench_sample::{load_sample, save_sample, MatrixPattern, Sample, SampleConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

const DEFAULT_SAMPLE: &str = "samples/default_sample.bin";
const DEFAULT_VERBOSE_FILE: &str = "verbose_matrices.txt";

/// Exit status when the kernel output fails verification.
const VERIFY_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "gemmbench", about = "GEMM kernel benchmark and verification tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate operand matrices and their reference product into a sample file.
    Generate {
        #[arg(long, default_value_t = 512)]
        m: usize,
        #[arg(long, default_value_t = 512)]
        n: usize,
        #[arg(long, default_value_t = 512)]
        k: usize,
        #[arg(long, default_value = "float32")]
        dtype: DataType,
        #[arg(long, default_value = "random")]
        pattern: MatrixPattern,
        #[arg(long, default_value = DEFAULT_SAMPLE)]
        sample: PathBuf,
    },
    /// Benchmark a registered kernel on a sample and verify its output.
    Run {
        #[arg(long)]
        op: String,
        #[arg(long, default_value = DEFAULT_SAMPLE)]
        sample: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1e-3)]
        atol: f64,
        #[arg(long, default_value_t = 1e-2)]
        rtol: f64,
        /// Dump A, B, reference C and computed C for debugging.
        #[arg(long)]
        verbose: bool,
        /// Destination of the matrix dump written with `--verbose`.
        #[arg(long, default_value = DEFAULT_VERBOSE_FILE)]
        verbose_matrix_file: PathBuf,
    },
    /// List registered kernels.
    ListOps,
}

pub fn run_cli(cli: Cli) -> Result<ExitCode> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let registry = KernelRegistry::with_default_kernels();

    match cli.command {
        Command::Generate {
            m,
            n,
            k,
            dtype,
            pattern,
            sample,
        } => {
            let cfg = SampleConfig::new(m, n, k, dtype);
            info!(m, n, k, dtype = %dtype, pattern = %pattern, "generating sample");
            let data = Sample::generate(cfg, pattern).context("failed to generate sample")?;
            save_sample(&sample, &data)
                .with_context(|| format!("failed to save sample to {}", sample.display()))?;
            println!(
                "Saved sample to {}: A {}x{}, B {}x{}, dtype={}, reference C computed",
                sample.display(),
                m,
                k,
                k,
                n,
                dtype
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            op,
            sample,
            output,
            atol,
            rtol,
            verbose,
            verbose_matrix_file,
        } => run_benchmark(
            &registry,
            &op,
            &sample,
            output,
            VerificationTolerance::new(atol, rtol),
            verbose.then_some(verbose_matrix_file.as_path()),
        ),
        Command::ListOps => {
            let mut names = registry.names();
            names.sort_unstable();
            for name in names {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_benchmark(
    registry: &KernelRegistry,
    op: &str,
    sample_path: &Path,
    output: Option<PathBuf>,
    tolerance: VerificationTolerance,
    matrix_dump: Option<&Path>,
) -> Result<ExitCode> {
    let mut kernel = registry.create(op)?;
    let sample = load_sample(sample_path)
        .with_context(|| format!("failed to load sample {}", sample_path.display()))?;
    let cfg = *sample.cfg();

    if !kernel.supports_dtype(cfg.dtype) {
        bail!("kernel {op} does not support dtype {}", cfg.dtype);
    }

    info!(
        op,
        m = cfg.m,
        n = cfg.n,
        k = cfg.k,
        dtype = %cfg.dtype,
        sample = %sample_path.display(),
        "running kernel"
    );

    let mut computed = MatrixBuffer::zeros(cfg.m, cfg.n, cfg.dtype);
    let bench = measure(kernel.as_mut(), &cfg, sample.a(), sample.b(), &mut computed)?;
    println!("Time = {:.3} ms", bench.elapsed_ms);
    println!("GFLOPS = {:.3}", bench.gflops(&cfg));

    let verification = verify_buffer(sample.c(), &computed, &tolerance)?;
    match &verification.mismatch {
        None => println!(
            "Verification PASSED. max_abs_err={:.3e}, max_rel_err={:.3e}",
            verification.max_abs_error, verification.max_rel_error
        ),
        Some(mismatch) => {
            warn!(op, index = mismatch.index, "verification failed");
            eprintln!(
                "Verification FAILED at ({}, {}). expected={} actual={} abs_err={:.3e} rel_err={:.3e}",
                mismatch.row,
                mismatch.col,
                mismatch.expected,
                mismatch.actual,
                mismatch.abs_error,
                mismatch.rel_error
            );
        }
    }

    if let Some(path) = matrix_dump {
        let mut out = BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        );
        write_matrix_dump(&mut out, &sample, &computed)?;
        out.flush()?;
        println!("Saved matrices to {}", path.display());
    }

    if let Some(path) = output {
        let report = RunReport::new(op, &cfg, &bench, &verification);
        report
            .save(&path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Saved result to {}", path.display());
    }

    if verification.ok {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(VERIFY_FAILED))
    }
}

/// Writes operands, reference and computed results as labelled row-major blocks.
fn write_matrix_dump<W: Write>(
    out: &mut W,
    sample: &Sample,
    computed: &MatrixBuffer,
) -> Result<()> {
    let cfg = sample.cfg();
    writeln!(out, "==============================")?;
    writeln!(out, "Matrix A:")?;
    sample.a().print(out)?;
    writeln!(out, "------------------------------")?;
    writeln!(out, "Matrix B:")?;
    sample.b().print(out)?;
    writeln!(out, "------------------------------")?;
    writeln!(out, "Reference Matrix C:")?;
    write_matrix(out, sample.c(), cfg.m, cfg.n)?;
    writeln!(out, "------------------------------")?;
    writeln!(out, "Computed Matrix C:")?;
    computed.print(out)?;
    writeln!(out, "==============================")?;
    Ok(())
}
