//! dupematch: find files with identical content across directory trees.
//!
//! # Overview
//!
//! dupematch walks one or two directory trees, fingerprints every file with
//! BLAKE3, and pairs files whose fingerprint and size both agree. Two modes:
//!
//! - **Dual-root**: every file in the first tree is checked for a
//!   content-equal counterpart in the second.
//! - **Single-root**: duplicates are found within one tree; the first-seen
//!   copy of each content group is the canonical one.
//!
//! The resulting ordered match set can be reviewed and selectively deleted,
//! permanently or to the system trash.
//!
//! # Library usage
//!
//! ```no_run
//! use dupematch::matching::MatchBuilder;
//! use dupematch::scanner::WalkOptions;
//! use std::path::Path;
//!
//! let builder = MatchBuilder::new(WalkOptions::default());
//! let outcome = builder.build_dual_root(Path::new("/photos"), Path::new("/backup"))?;
//! for m in &outcome.matches {
//!     println!("{} == {}", m.file1.display(), m.file2.display());
//! }
//! # Ok::<(), dupematch::matching::BuildError>(())
//! ```

pub mod actions;
pub mod cli;
pub mod error;
pub mod logging;
pub mod matching;
pub mod progress;
pub mod review;
pub mod scanner;
pub mod signal;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use bytesize::ByteSize;

use crate::actions::{DeleteExecutor, DeleteMode, Side};
use crate::cli::{Cli, DeleteSide};
use crate::error::ExitCode;
use crate::matching::{BuildError, BuilderConfig, Match, MatchBuilder, ScanMode, ScanOutcome};
use crate::progress::Progress;
use crate::review::MatchSet;
use crate::scanner::WalkOptions;
use crate::signal::install_handler;

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code the process should terminate with. A canceled
/// scan surfaces as [`BuildError::Interrupted`] through the error channel;
/// the binary entry point maps it to exit code 130.
///
/// # Errors
///
/// Returns an error for invalid roots, scan interruption, or a failure to
/// install the signal handler.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.dir2.is_none() && !cli.single {
        return Err(BuildError::MissingSecondRoot.into());
    }

    let handler = install_handler()?;

    let options = WalkOptions {
        recursive: !cli.no_recurse,
        skip_hidden: cli.skip_hidden,
        ignore_patterns: cli.ignore_patterns.clone(),
    };

    let progress = Arc::new(Progress::new(cli.quiet));
    let config = BuilderConfig::default()
        .with_io_threads(cli.io_threads)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);

    let builder = MatchBuilder::new(options).with_config(config);

    let mode = if cli.single {
        ScanMode::SingleRoot
    } else {
        ScanMode::DualRoot
    };

    let outcome = match mode {
        ScanMode::SingleRoot => builder.build_single_root(&cli.dir1)?,
        ScanMode::DualRoot => {
            // Presence checked above
            let dir2 = cli.dir2.as_deref().ok_or(BuildError::MissingSecondRoot)?;
            builder.build_dual_root(&cli.dir1, dir2)?
        }
    };

    render_outcome(&outcome, cli.quiet);

    let had_skips = outcome.error_count() > 0;
    let no_matches = outcome.matches.is_empty();

    let mut delete_failed = false;
    if let Some(side) = cli.delete_from {
        if !no_matches {
            delete_failed = !run_bulk_delete(&cli, side, outcome.matches)?;
        }
    }

    Ok(if no_matches {
        ExitCode::NoMatches
    } else if had_skips || delete_failed {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

/// Print the ordered match listing and skip summary.
fn render_outcome(outcome: &ScanOutcome, quiet: bool) {
    if quiet {
        return;
    }

    if outcome.matches.is_empty() {
        println!("No matches found.");
    } else {
        println!("Found {} match(es):\n", outcome.matches.len());
        for (i, m) in outcome.matches.iter().enumerate() {
            println!("{:>4}. {}", i + 1, format_match(m));
        }
    }

    if !outcome.skipped.is_empty() {
        println!("\n{} file(s) skipped:", outcome.skipped.len());
        for skip in &outcome.skipped {
            println!("  {}: {}", skip.path.display(), skip.reason);
        }
    }
}

/// One listing line for a match.
fn format_match(m: &Match) -> String {
    let tag = if m.is_image { " [image]" } else { "" };
    format!(
        "{} ({}) == {}{}",
        m.file1.display(),
        display_size(&m.file1),
        m.file2.display(),
        tag
    )
}

fn display_size(path: &Path) -> String {
    fs::metadata(path).map_or_else(|_| "?".to_string(), |md| ByteSize(md.len()).to_string())
}

/// Delete one side of every match, with a confirmation prompt unless
/// `--yes` was given. Returns whether every attempted deletion succeeded.
fn run_bulk_delete(cli: &Cli, side: DeleteSide, matches: Vec<Match>) -> anyhow::Result<bool> {
    let side = match side {
        DeleteSide::First => Side::First,
        DeleteSide::Second => Side::Second,
    };
    let mode = if cli.trash {
        DeleteMode::Trash
    } else {
        DeleteMode::Permanent
    };

    let mut set = MatchSet::new(matches);

    if !cli.yes && !confirm_deletion(set.len(), side, mode)? {
        println!("Deletion canceled.");
        return Ok(true);
    }

    let executor = DeleteExecutor::new(mode);
    let summary = executor.delete_all_on_side(&mut set, side);

    if !cli.quiet {
        println!("{}", summary.summary());
        for (path, reason) in &summary.failures {
            eprintln!("Failed to delete {}: {}", path.display(), reason);
        }
    }

    Ok(summary.all_succeeded())
}

/// Ask the user to confirm a bulk deletion on stdin.
fn confirm_deletion(count: usize, side: Side, mode: DeleteMode) -> anyhow::Result<bool> {
    let action = match mode {
        DeleteMode::Permanent => "permanently delete",
        DeleteMode::Trash => "move to trash",
    };
    print!("About to {} the {} file of {} match(es). Continue? [y/N] ", action, side, count);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
