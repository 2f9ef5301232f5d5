//! s3nav - browse S3-compatible buckets as folders
//!
//! Lists one folder level at a time, filters and pages through it, and
//! exports selected items as a single tar.gz archive.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG; logs go to stderr so --json output stays clean
    let filter = if cli.debug {
        EnvFilter::new("s3nav=debug,s3nav_core=debug,s3nav_s3=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
