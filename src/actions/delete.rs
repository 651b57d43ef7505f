//! Deletion executor: remove files from disk and the live match set.
//!
//! # Overview
//!
//! Disk deletion and match-set mutation must not diverge from the caller's
//! perspective: a match leaves the set only after its file is actually gone
//! from disk, and a failed deletion leaves the set untouched so the match
//! stays visible for retry.
//!
//! Two modes are supported: move to the system trash (recoverable) or
//! permanent removal.
//!
//! # Example
//!
//! ```no_run
//! use dupematch::actions::{DeleteExecutor, DeleteMode, Side};
//! use dupematch::review::MatchSet;
//!
//! let mut set = MatchSet::new(vec![]);
//! let executor = DeleteExecutor::new(DeleteMode::Permanent);
//! let summary = executor.delete_all_on_side(&mut set, Side::Second);
//! println!("{}", summary.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::review::MatchSet;

/// Which file of a match a deletion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `file1` — root 1 in dual-root mode, the canonical copy in single-root.
    First,
    /// `file2` — root 2 in dual-root mode, the duplicate in single-root.
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
        }
    }
}

/// How files are removed from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Permanent removal via `fs::remove_file`. Cannot be undone.
    #[default]
    Permanent,
    /// Move to the system trash; recoverable.
    Trash,
}

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// No match exists at the requested index.
    #[error("no match at index {0}")]
    InvalidIndex(usize),

    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful single deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Summary of a bulk one-side deletion.
#[derive(Debug, Clone, Default)]
pub struct SideDeleteSummary {
    /// Number of matches whose side file was deleted.
    pub deleted: usize,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Failed deletions with their reasons; the matches stay in the set.
    pub failures: Vec<(PathBuf, String)>,
}

impl SideDeleteSummary {
    /// Check if every attempted deletion succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {} bytes", self.deleted, self.bytes_freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {} bytes",
                self.deleted,
                self.failures.len(),
                self.bytes_freed
            )
        }
    }
}

/// Deletes match-side files from disk and the live match set together.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteExecutor {
    mode: DeleteMode,
}

impl DeleteExecutor {
    /// Create an executor with the given deletion mode.
    #[must_use]
    pub fn new(mode: DeleteMode) -> Self {
        Self { mode }
    }

    /// Delete one side of the match at `index`.
    ///
    /// The match is removed from the set only after the file is gone from
    /// disk. On failure the set is left unmodified and the match remains
    /// visible for retry.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::InvalidIndex`] for an out-of-range index, or
    /// the underlying filesystem error.
    pub fn delete_one(
        &self,
        set: &mut MatchSet,
        index: usize,
        side: Side,
    ) -> Result<DeleteResult, DeleteError> {
        let path = set
            .get(index)
            .ok_or(DeleteError::InvalidIndex(index))?
            .path_on(side)
            .to_path_buf();

        let result = self.delete_from_disk(&path)?;
        set.remove_at(index);

        log::info!(
            "Deleted {} side of match {}: {} ({} bytes)",
            side,
            index,
            path.display(),
            result.size
        );

        Ok(result)
    }

    /// Delete the given side of every match in the set.
    ///
    /// Iterates a snapshot of the current sequence; each successfully
    /// deleted match is removed from the live set as it succeeds, failures
    /// are collected and never abort the remaining deletions.
    pub fn delete_all_on_side(&self, set: &mut MatchSet, side: Side) -> SideDeleteSummary {
        let mut summary = SideDeleteSummary::default();

        // Successful removal shifts later matches down to `index`; a
        // failure leaves the match in place, so the scan moves past it.
        let mut index = 0;
        while index < set.len() {
            let path = set
                .get(index)
                .map(|m| m.path_on(side).to_path_buf())
                .unwrap_or_default();

            match self.delete_from_disk(&path) {
                Ok(result) => {
                    set.remove_at(index);
                    summary.deleted += 1;
                    summary.bytes_freed += result.size;
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", path.display(), e);
                    summary.failures.push((path, e.to_string()));
                    index += 1;
                }
            }
        }

        log::info!("Bulk deletion on {} side: {}", side, summary.summary());
        summary
    }

    /// Remove one file from disk per the configured mode.
    fn delete_from_disk(&self, path: &Path) -> Result<DeleteResult, DeleteError> {
        // Size is captured before deletion for the bytes-freed summary
        let metadata = fs::metadata(path).map_err(|e| map_io_error(path, e))?;
        let size = metadata.len();

        match self.mode {
            DeleteMode::Permanent => {
                fs::remove_file(path).map_err(|e| map_io_error(path, e))?;
            }
            DeleteMode::Trash => {
                trash::delete(path).map_err(|e| DeleteError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        Ok(DeleteResult {
            path: path.to_path_buf(),
            size,
            permanent: self.mode == DeleteMode::Permanent,
        })
    }
}

fn map_io_error(path: &Path, error: io::Error) -> DeleteError {
    match error.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
