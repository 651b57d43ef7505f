//! Command-line interface definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which side of the match list a bulk deletion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteSide {
    /// Delete the root-1 file of every match.
    #[value(name = "1")]
    First,
    /// Delete the root-2 file of every match.
    #[value(name = "2")]
    Second,
}

/// Find files with identical content in one or two directory trees.
///
/// With two directories, every file in DIR1 is checked for a content-equal
/// counterpart in DIR2. With --single, duplicates are found within DIR1
/// alone.
#[derive(Parser, Debug)]
#[command(
    name = "dupematch",
    author,
    version,
    about = "Find files with identical content across directory trees",
    long_about = None
)]
pub struct Cli {
    /// First directory to scan
    pub dir1: PathBuf,

    /// Second directory to scan (omit with --single)
    pub dir2: Option<PathBuf>,

    /// Find duplicates within DIR1 alone
    #[arg(long, conflicts_with = "dir2")]
    pub single: bool,

    /// Do not descend into subdirectories
    #[arg(long)]
    pub no_recurse: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Glob patterns to exclude (can be repeated)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Number of threads for fingerprinting (0 = one per CPU core)
    #[arg(long, value_name = "N", default_value_t = 0, env = "DUPEMATCH_IO_THREADS")]
    pub io_threads: usize,

    /// Delete the given side of every match after the scan
    #[arg(long, value_name = "SIDE", value_enum)]
    pub delete_from: Option<DeleteSide>,

    /// Move deleted files to the system trash instead of removing permanently
    #[arg(long)]
    pub trash: bool,

    /// Skip the confirmation prompt before bulk deletion
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Emit errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and non-error logging
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
