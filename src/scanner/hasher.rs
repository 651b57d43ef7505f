//! BLAKE3 file fingerprinting with streaming reads.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content
//! fingerprints of files. Files are read in fixed-size chunks and folded
//! into an incremental BLAKE3 hasher, so memory use is bounded regardless
//! of file size.
//!
//! Fingerprints are deterministic: identical byte content always yields an
//! identical fingerprint, regardless of path or filesystem metadata.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;

/// A 256-bit BLAKE3 content fingerprint.
pub type Fingerprint = [u8; 32];

/// Size of the read buffer used when streaming file content.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming BLAKE3 file hasher.
///
/// # Example
///
/// ```no_run
/// use dupematch::scanner::Hasher;
/// use std::path::Path;
///
/// let hasher = Hasher::new();
/// let fingerprint = hasher.hash_file(Path::new("/tmp/file.txt")).unwrap();
/// println!("{}", dupematch::scanner::fingerprint_to_hex(&fingerprint));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the fingerprint of a file's full content.
    ///
    /// Reads the file in [`CHUNK_SIZE`] chunks and folds each chunk into a
    /// running digest, finalizing after end of input.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// mid-stream.
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let mut file = File::open(path).map_err(|e| Self::map_io_error(path, e))?;

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let read = file
                .read(&mut buffer)
                .map_err(|e| Self::map_io_error(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    fn map_io_error(path: &Path, error: io::Error) -> HashError {
        match error.kind() {
            io::ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
            _ => HashError::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Render a fingerprint as a lowercase hex string.
#[must_use]
pub fn fingerprint_to_hex(fingerprint: &Fingerprint) -> String {
    fingerprint.iter().map(|b| format!("{b:02x}")).collect()
}
