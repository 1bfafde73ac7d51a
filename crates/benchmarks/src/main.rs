//! Benchmark driver executable for gemmbench.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{run_cli, Cli};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    run_cli(cli)
}
