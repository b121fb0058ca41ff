use clap::Parser;
use std::path::PathBuf;

/// Compare two directory trees and report per-entry differences
#[derive(Parser, Debug)]
#[command(name = "dirdelta", version, about, long_about = None)]
pub struct Cli {
    /// First tree root
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    /// Second tree root
    #[arg(value_name = "SECOND")]
    pub second: PathBuf,

    /// Compare file contents (SHA-256) instead of the size+mtime heuristic
    #[arg(long)]
    pub content: bool,

    /// Follow symlinks instead of comparing them as links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// List everything inside directories present on only one side
    #[arg(long)]
    pub expand_unique: bool,

    /// Tolerance in seconds when comparing modification times
    #[arg(long, value_name = "SECONDS", default_value_t = 2.0)]
    pub time_tolerance: f64,

    /// Also print identical entries
    #[arg(long)]
    pub all: bool,

    /// Emit the full report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
