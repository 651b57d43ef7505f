//! Match construction module.
//!
//! This module provides functionality for:
//! - Fingerprint bucketing ([`index`])
//! - Single-root and dual-root match building ([`builder`])
//!
//! A [`Match`] is one ordered pairing of two distinct files judged
//! duplicate: equal fingerprint and equal size.

pub mod builder;
pub mod index;

use std::path::{Path, PathBuf};

use crate::scanner::FileCandidate;

pub use builder::{
    BuildError, BuilderConfig, MatchBuilder, ScanOutcome, ScanStats, SkippedFile,
};
pub use index::FingerprintIndex;

/// File extensions treated as images for display purposes.
///
/// Classification only affects which renderer a presentation layer picks,
/// never the matching logic itself.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "heic", "tiff"];

/// Check whether a path has an image extension.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Duplicate detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Duplicates within one directory tree.
    SingleRoot,
    /// Duplicates between two separate trees, directional (root 1 vs root 2).
    DualRoot,
}

/// One ordered pairing of two distinct duplicate files.
///
/// In dual-root mode `file1` is always drawn from root 1 and `file2` from
/// root 2. In single-root mode `file1` is the first-seen (canonical) copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Path of the first (kept / reference) file
    pub file1: PathBuf,
    /// Path of the second (duplicate) file
    pub file2: PathBuf,
    /// Display name of the first file
    pub name1: String,
    /// Display name of the second file
    pub name2: String,
    /// Whether file1 has an image extension
    pub is_image: bool,
}

impl Match {
    /// Pair two candidates. `file1 != file2` must hold; callers guarantee it.
    #[must_use]
    pub fn pair(first: &FileCandidate, second: &FileCandidate) -> Self {
        debug_assert_ne!(first.path, second.path, "a file cannot match itself");
        Self {
            file1: first.path.clone(),
            file2: second.path.clone(),
            name1: first.name.clone(),
            name2: second.name.clone(),
            is_image: is_image_path(&first.path),
        }
    }

    /// Path on the given side (1-based in the UI sense).
    #[must_use]
    pub fn path_on(&self, side: crate::actions::Side) -> &Path {
        match side {
            crate::actions::Side::First => &self.file1,
            crate::actions::Side::Second => &self.file2,
        }
    }
}
