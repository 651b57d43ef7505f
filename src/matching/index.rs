//! Fingerprint index: fingerprint → ordered bucket of candidates.
//!
//! # Overview
//!
//! The index is built once per scan by pure accumulation; there is no
//! removal operation. Both orders the matcher depends on are preserved:
//!
//! - bucket discovery order (the order in which fingerprints were first
//!   inserted), which drives single-root match ordering, and
//! - insertion order within a bucket, which decides the "first file wins
//!   as canonical" tie-break.
//!
//! A plain `HashMap` would lose discovery order, so buckets live in a
//! `Vec` and the map only stores bucket positions.

use std::collections::HashMap;

use crate::scanner::{FileCandidate, Fingerprint};

/// A fingerprint bucket: every candidate inserted under one fingerprint,
/// in insertion order.
#[derive(Debug, Clone)]
pub struct Bucket {
    /// The shared fingerprint
    pub fingerprint: Fingerprint,
    /// Candidates in insertion order
    pub files: Vec<FileCandidate>,
}

/// Index mapping fingerprints to ordered candidate buckets.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    buckets: Vec<Bucket>,
    positions: HashMap<Fingerprint, usize>,
}

impl FingerprintIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate under its fingerprint.
    ///
    /// Creates the bucket on first sight of a fingerprint; appends in
    /// insertion order otherwise.
    pub fn insert(&mut self, candidate: FileCandidate, fingerprint: Fingerprint) {
        match self.positions.get(&fingerprint) {
            Some(&pos) => self.buckets[pos].files.push(candidate),
            None => {
                self.positions.insert(fingerprint, self.buckets.len());
                self.buckets.push(Bucket {
                    fingerprint,
                    files: vec![candidate],
                });
            }
        }
    }

    /// Look up the candidates previously inserted under a fingerprint.
    ///
    /// Returns `None` when the fingerprint has never been seen.
    #[must_use]
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<&[FileCandidate]> {
        self.positions
            .get(fingerprint)
            .map(|&pos| self.buckets[pos].files.as_slice())
    }

    /// Iterate buckets in discovery order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of candidates across all buckets.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.iter().map(|b| b.files.len()).sum()
    }
}
