use clap::Parser;
use std::path::PathBuf;

use crate::types::DigestAlgorithm;

/// Find images, fingerprint their content, and show their capture metadata.
#[derive(Clone, Parser)]
#[command(name = "snookr")]
#[command(about = "Digest every image under one or more root folders.")]
pub struct Cli {
    /// Root folders to walk. Each is an independent run.
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Number of concurrent digest workers per root. Default: 20.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Content hash to compute.
    #[arg(long, short = 'a', value_enum)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Image extensions to digest (case-insensitive). Default: jpg jpeg.
    #[arg(long = "ext", short = 'e', num_args = 1..)]
    pub extensions: Vec<String>,

    /// Exclude patterns (glob syntax) matched on file and folder names. Can specify multiple.
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Print one JSON object per image instead of text.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Skip EXIF metadata extraction.
    #[arg(long)]
    pub no_metadata: bool,

    /// Strict mode: fail the root on the first unreadable folder instead of skipping it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Give up on a root after this many seconds.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
