//! Match builder: walk, fingerprint, and pair duplicate files.
//!
//! # Overview
//!
//! Two algorithms, chosen by mode:
//!
//! - **Single-root**: walk one root, fingerprint every candidate into one
//!   [`FingerprintIndex`], then for every bucket with two or more members
//!   pair the first-seen file against each subsequent member, subject to a
//!   size equality recheck.
//! - **Dual-root**: walk and fingerprint root 1 into a flat ordered
//!   sequence, root 2 into an index, then probe the index with each root-1
//!   file in walk order. First size-equal bucket member wins; at most one
//!   match per root-1 file.
//!
//! Fingerprinting of independent files runs on a bounded rayon pool; walk
//! order is restored when results are aggregated, so match ordering never
//! depends on thread scheduling.
//!
//! Per-file I/O failures are collected as [`SkippedFile`] entries and never
//! abort the build. Invalid roots fail before any work begins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{FileCandidate, Fingerprint, HashError, Hasher, WalkOptions, Walker};

use super::index::FingerprintIndex;
use super::Match;

/// Errors that abort a match build.
///
/// Per-file I/O problems are not build errors; they surface as
/// [`SkippedFile`] entries in the outcome instead.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    /// A scan root does not exist.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// A scan root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Dual-root mode was requested without a second root.
    #[error("A second root is required unless single-root mode is enabled")]
    MissingSecondRoot,

    /// The fingerprinting thread pool could not be created.
    #[error("Failed to create hashing thread pool: {0}")]
    ThreadPool(String),

    /// The scan was canceled via the shutdown flag. Partial results are
    /// discarded; the caller never sees a torn structure.
    #[error("Scan interrupted")]
    Interrupted,
}

/// A file excluded from the scan, with the reason why.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the file that was skipped
    pub path: PathBuf,
    /// Human-readable failure reason
    pub reason: String,
}

/// Statistics from a match build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidates discovered by the walk(s)
    pub scanned_files: usize,
    /// Candidates successfully fingerprinted
    pub hashed_files: usize,
    /// Files skipped due to per-file I/O errors
    pub skipped_files: usize,
    /// Matches emitted
    pub match_count: usize,
}

/// Terminal result of a match build.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Ordered match sequence
    pub matches: Vec<Match>,
    /// Files that could not be read, with reasons
    pub skipped: Vec<SkippedFile>,
    /// Aggregate counters
    pub stats: ScanStats,
}

impl ScanOutcome {
    /// Number of per-file errors observed during the scan.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Configuration for a match build.
#[derive(Clone, Default)]
pub struct BuilderConfig {
    /// Number of threads for parallel fingerprinting.
    /// Zero means one per available CPU core.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for BuilderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl BuilderConfig {
    /// Set the fingerprinting thread count (0 = available cores).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Effective thread count for the hashing pool.
    fn effective_threads(&self) -> usize {
        if self.io_threads == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.io_threads
        }
    }
}

/// Builds the ordered match sequence for one or two roots.
///
/// # Example
///
/// ```no_run
/// use dupematch::matching::MatchBuilder;
/// use dupematch::scanner::WalkOptions;
/// use std::path::Path;
///
/// let builder = MatchBuilder::new(WalkOptions::default());
/// let outcome = builder.build_single_root(Path::new("/photos")).unwrap();
/// println!("{} matches, {} skipped", outcome.matches.len(), outcome.error_count());
/// ```
#[derive(Debug)]
pub struct MatchBuilder {
    options: WalkOptions,
    config: BuilderConfig,
}

impl MatchBuilder {
    /// Create a builder with the given walk options and default config.
    #[must_use]
    pub fn new(options: WalkOptions) -> Self {
        Self {
            options,
            config: BuilderConfig::default(),
        }
    }

    /// Replace the build configuration.
    #[must_use]
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Find duplicates within a single root.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::RootNotFound`] / [`BuildError::NotADirectory`]
    /// before any work begins, or [`BuildError::Interrupted`] on cancel.
    pub fn build_single_root(&self, root: &Path) -> Result<ScanOutcome, BuildError> {
        validate_root(root)?;

        let mut outcome = ScanOutcome::default();

        let candidates = self.collect_candidates(root, &mut outcome);
        self.check_interrupted()?;
        outcome.stats.scanned_files = candidates.len();

        let hashed = self.hash_candidates(candidates)?;

        let mut index = FingerprintIndex::new();
        for (candidate, result) in hashed {
            match result {
                Ok(fingerprint) => {
                    outcome.stats.hashed_files += 1;
                    index.insert(candidate, fingerprint);
                }
                Err(e) => self.record_skip(&mut outcome, candidate.path, &e),
            }
        }

        outcome.matches = single_root_matches(&index);
        outcome.stats.skipped_files = outcome.skipped.len();
        outcome.stats.match_count = outcome.matches.len();

        log::info!(
            "Single-root scan complete: {} files, {} matches, {} skipped",
            outcome.stats.scanned_files,
            outcome.stats.match_count,
            outcome.stats.skipped_files
        );

        Ok(outcome)
    }

    /// Find duplicates between two roots, directional (root 1 vs root 2).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::RootNotFound`] / [`BuildError::NotADirectory`]
    /// before any work begins, or [`BuildError::Interrupted`] on cancel.
    pub fn build_dual_root(&self, root1: &Path, root2: &Path) -> Result<ScanOutcome, BuildError> {
        validate_root(root1)?;
        validate_root(root2)?;

        let mut outcome = ScanOutcome::default();

        // Root 1 stays a flat ordered sequence; its walk order fixes the
        // match order.
        self.on_message(&format!("Scanning {}", root1.display()));
        let candidates1 = self.collect_candidates(root1, &mut outcome);
        self.check_interrupted()?;
        outcome.stats.scanned_files += candidates1.len();

        let mut sequence: Vec<(FileCandidate, Fingerprint)> = Vec::new();
        for (candidate, result) in self.hash_candidates(candidates1)? {
            match result {
                Ok(fingerprint) => {
                    outcome.stats.hashed_files += 1;
                    sequence.push((candidate, fingerprint));
                }
                Err(e) => self.record_skip(&mut outcome, candidate.path, &e),
            }
        }

        // Root 2 is fully indexed, then probed.
        self.on_message(&format!("Scanning {}", root2.display()));
        let candidates2 = self.collect_candidates(root2, &mut outcome);
        self.check_interrupted()?;
        outcome.stats.scanned_files += candidates2.len();

        let mut index = FingerprintIndex::new();
        for (candidate, result) in self.hash_candidates(candidates2)? {
            match result {
                Ok(fingerprint) => {
                    outcome.stats.hashed_files += 1;
                    index.insert(candidate, fingerprint);
                }
                Err(e) => self.record_skip(&mut outcome, candidate.path, &e),
            }
        }

        outcome.matches = dual_root_matches(&sequence, &index);
        outcome.stats.skipped_files = outcome.skipped.len();
        outcome.stats.match_count = outcome.matches.len();

        log::info!(
            "Dual-root scan complete: {} files, {} matches, {} skipped",
            outcome.stats.scanned_files,
            outcome.stats.match_count,
            outcome.stats.skipped_files
        );

        Ok(outcome)
    }

    /// Walk one root, collecting candidates and recording stat failures.
    fn collect_candidates(&self, root: &Path, outcome: &mut ScanOutcome) -> Vec<FileCandidate> {
        let mut walker = Walker::new(root, self.options.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut candidates = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(candidate) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback
                            .on_progress(candidates.len() + 1, &candidate.path.to_string_lossy());
                    }
                    candidates.push(candidate);
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    outcome.skipped.push(SkippedFile {
                        path: e.path().to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        candidates
    }

    /// Fingerprint candidates on a bounded pool, preserving input order.
    ///
    /// Ordering is restored at aggregation: the parallel map collects back
    /// into walk order, so downstream match ordering is deterministic.
    fn hash_candidates(
        &self,
        candidates: Vec<FileCandidate>,
    ) -> Result<Vec<(FileCandidate, Result<Fingerprint, HashError>)>, BuildError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", candidates.len());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_threads())
            .build()
            .map_err(|e| BuildError::ThreadPool(e.to_string()))?;

        let hasher = Hasher::new();
        let processed = AtomicUsize::new(0);

        let results: Vec<(FileCandidate, Result<Fingerprint, HashError>)> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|candidate| {
                    // Cooperative cancel: checked between files, never mid-read
                    if self.config.is_shutdown_requested() {
                        let err = HashError::Io {
                            path: candidate.path.clone(),
                            source: std::io::Error::new(
                                std::io::ErrorKind::Interrupted,
                                "scan interrupted",
                            ),
                        };
                        return (candidate, Err(err));
                    }

                    let result = hasher.hash_file(&candidate.path);

                    let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(current, &candidate.path.to_string_lossy());
                    }

                    (candidate, result)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        // A canceled scan discards partial results entirely
        self.check_interrupted()?;

        Ok(results)
    }

    fn record_skip(&self, outcome: &mut ScanOutcome, path: PathBuf, error: &HashError) {
        log::warn!("Failed to fingerprint {}: {}", path.display(), error);
        outcome.skipped.push(SkippedFile {
            path,
            reason: error.to_string(),
        });
    }

    fn check_interrupted(&self) -> Result<(), BuildError> {
        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted by shutdown signal");
            Err(BuildError::Interrupted)
        } else {
            Ok(())
        }
    }

    fn on_message(&self, message: &str) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_message(message);
        }
    }
}

/// Validate a scan root before any work begins.
fn validate_root(root: &Path) -> Result<(), BuildError> {
    if !root.exists() {
        return Err(BuildError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(BuildError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Emit matches from a fully built single-root index.
///
/// For every bucket with two or more members, the first-seen file is the
/// canonical copy; each subsequent member pairs against it. Size equality
/// is rechecked per pair as a guard against fingerprint collisions and
/// files changed between indexing and comparison. Match order follows
/// bucket discovery order, then within-bucket insertion order.
#[must_use]
pub fn single_root_matches(index: &FingerprintIndex) -> Vec<Match> {
    let mut matches = Vec::new();

    for bucket in index.buckets() {
        let Some((first, rest)) = bucket.files.split_first() else {
            continue;
        };
        for other in rest {
            if other.size == first.size {
                matches.push(Match::pair(first, other));
            } else {
                log::warn!(
                    "Fingerprint collision with differing sizes: {} vs {}",
                    first.path.display(),
                    other.path.display()
                );
            }
        }
    }

    matches
}

/// Probe a root-2 index with a root-1 sequence, in root-1 walk order.
///
/// Each root-1 file yields at most one match: the first size-equal member
/// of its fingerprint bucket, in bucket insertion order (first-match-wins).
/// Fingerprint hits with no size-equal member yield nothing.
#[must_use]
pub fn dual_root_matches(
    sequence: &[(FileCandidate, Fingerprint)],
    index: &FingerprintIndex,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for (file1, fingerprint) in sequence {
        let Some(bucket) = index.lookup(fingerprint) else {
            continue;
        };
        if let Some(file2) = bucket
            .iter()
            .find(|c| c.size == file1.size && c.path != file1.path)
        {
            matches.push(Match::pair(file1, file2));
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_candidate(path: &str, size: u64) -> FileCandidate {
        FileCandidate::new(PathBuf::from(path), size)
    }

    fn fp(byte: u8) -> Fingerprint {
        [byte; 32]
    }

    #[test]
    fn test_single_root_pairs_first_against_each_subsequent() {
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/a.txt", 5), fp(1));
        index.insert(make_candidate("/b.txt", 5), fp(1));
        index.insert(make_candidate("/c.txt", 5), fp(1));

        let matches = single_root_matches(&index);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].file1, PathBuf::from("/a.txt"));
        assert_eq!(matches[0].file2, PathBuf::from("/b.txt"));
        assert_eq!(matches[1].file1, PathBuf::from("/a.txt"));
        assert_eq!(matches[1].file2, PathBuf::from("/c.txt"));
    }

    #[test]
    fn test_single_root_size_mismatch_suppresses_match() {
        // Forced fingerprint collision: same fingerprint, different sizes.
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/a.txt", 5), fp(1));
        index.insert(make_candidate("/b.txt", 9), fp(1));

        assert!(single_root_matches(&index).is_empty());
    }

    #[test]
    fn test_single_root_order_follows_discovery_then_insertion() {
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/g2-a.txt", 1), fp(2));
        index.insert(make_candidate("/g1-a.txt", 1), fp(1));
        index.insert(make_candidate("/g2-b.txt", 1), fp(2));
        index.insert(make_candidate("/g1-b.txt", 1), fp(1));

        let matches = single_root_matches(&index);
        assert_eq!(matches.len(), 2);
        // fp(2) was discovered first
        assert_eq!(matches[0].file1, PathBuf::from("/g2-a.txt"));
        assert_eq!(matches[1].file1, PathBuf::from("/g1-a.txt"));
    }

    #[test]
    fn test_dual_root_first_match_wins() {
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/dir2/g.png", 7), fp(1));
        index.insert(make_candidate("/dir2/h.png", 7), fp(1));

        let sequence = vec![(make_candidate("/dir1/f.png", 7), fp(1))];
        let matches = dual_root_matches(&sequence, &index);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file1, PathBuf::from("/dir1/f.png"));
        assert_eq!(matches[0].file2, PathBuf::from("/dir2/g.png"));
    }

    #[test]
    fn test_dual_root_skips_size_mismatched_bucket_members() {
        // First bucket member collides on fingerprint but not size; the
        // second is the real duplicate.
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/dir2/collision.bin", 99), fp(1));
        index.insert(make_candidate("/dir2/real.bin", 7), fp(1));

        let sequence = vec![(make_candidate("/dir1/f.bin", 7), fp(1))];
        let matches = dual_root_matches(&sequence, &index);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].file2, PathBuf::from("/dir2/real.bin"));
    }

    #[test]
    fn test_dual_root_no_size_equal_member_yields_nothing() {
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/dir2/other.bin", 99), fp(1));

        let sequence = vec![(make_candidate("/dir1/f.bin", 7), fp(1))];
        assert!(dual_root_matches(&sequence, &index).is_empty());
    }

    #[test]
    fn test_dual_root_never_matches_a_file_to_itself() {
        // Same directory passed as both roots
        let mut index = FingerprintIndex::new();
        index.insert(make_candidate("/dir/f.bin", 7), fp(1));

        let sequence = vec![(make_candidate("/dir/f.bin", 7), fp(1))];
        assert!(dual_root_matches(&sequence, &index).is_empty());
    }

    #[test]
    fn test_validate_root_missing() {
        let err = validate_root(Path::new("/nonexistent/root/98765")).unwrap_err();
        assert!(matches!(err, BuildError::RootNotFound(_)));
    }

    #[test]
    fn test_thread_pool_error_is_not_an_interruption() {
        // Exit-code mapping treats Interrupted specially (130); a pool
        // construction failure must stay a general error.
        let err = BuildError::ThreadPool("no threads available".to_string());
        assert!(!matches!(err, BuildError::Interrupted));
        assert!(err.to_string().contains("thread pool"));
    }

    #[test]
    fn test_builder_config_effective_threads() {
        assert!(BuilderConfig::default().effective_threads() >= 1);
        assert_eq!(
            BuilderConfig::default().with_io_threads(3).effective_threads(),
            3
        );
    }
}
