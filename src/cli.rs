//! Command line interface for the `idv-core-cli` demo binary.

use std::path::PathBuf;

use clap::Parser;

/// Runs the identity verification pipeline against a directory of test
/// fixture frames and prints the resulting attestation as pretty JSON.
#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Cli {
    /// Directory containing fixture frames (document back, document front,
    /// and the three liveness poses).
    #[clap(short = 'f', long)]
    pub fixtures: PathBuf,
    /// Load config from this file instead of using built-in defaults.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
}
