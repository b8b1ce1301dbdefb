//! Byte-exact content comparison.
//!
//! # Overview
//!
//! [`Comparator`] decides whether two files hold identical bytes. Both files
//! are read in lock-step chunks (10 MiB by default) and compared window by
//! window; the first mismatching window ends the comparison without reading
//! any further.
//!
//! Handles are scoped to a single comparison and closed on every exit path:
//! equal, different, cancelled, or I/O failure.
//!
//! A file that cannot be opened or read can never be proven equal to
//! anything, so failures are logged and reported as
//! [`Comparison::Different`].

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::cancel::CancellationToken;
use crate::scanner::FileDescriptor;

/// Default read size per file per step (10 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Bytes compared between two cancellation checks inside a chunk.
const COMPARE_WINDOW: usize = 64 * 1024;

/// Result of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both files were exhausted together with no mismatch.
    Equal,
    /// A byte differed, the lengths differed, or a file was unreadable.
    Different,
    /// The session was cancelled before a verdict was reached.
    Cancelled,
}

/// Errors raised while reading a pair of files.
///
/// These never escape the comparator; they are logged and turned into
/// [`Comparison::Different`].
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A read failed part way through.
    #[error("Read failed for {path}: {source}")]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Chunked, cancellable byte comparator.
///
/// Owns its read buffers, so one comparator serves every comparison of a
/// clustering task without reallocating. Not shared between threads.
pub struct Comparator {
    chunk_size: usize,
    token: CancellationToken,
    left: Vec<u8>,
    right: Vec<u8>,
    failures: usize,
}

impl Comparator {
    /// Create a comparator reading `chunk_size` bytes per file per step.
    ///
    /// A chunk size of zero is raised to one byte.
    #[must_use]
    pub fn new(chunk_size: usize, token: CancellationToken) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            token,
            left: Vec::new(),
            right: Vec::new(),
            failures: 0,
        }
    }

    /// Configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of comparisons that failed on open or read.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Whether the two files hold identical bytes.
    ///
    /// Cancellation and I/O failures both yield `false`.
    pub fn equal(&mut self, a: &FileDescriptor, b: &FileDescriptor) -> bool {
        self.compare(a, b) == Comparison::Equal
    }

    /// Compare two files and report the verdict.
    pub fn compare(&mut self, a: &FileDescriptor, b: &FileDescriptor) -> Comparison {
        let expected = a.size.max(b.size);
        match self.compare_paths(&a.path, &b.path, expected) {
            Ok(verdict) => {
                log::trace!(
                    "Compared {} and {}: {:?}",
                    a.path.display(),
                    b.path.display(),
                    verdict
                );
                verdict
            }
            Err(e) => {
                self.failures += 1;
                log::warn!("{}; treating the pair as different", e);
                Comparison::Different
            }
        }
    }

    fn compare_paths(
        &mut self,
        a: &Path,
        b: &Path,
        expected: u64,
    ) -> Result<Comparison, CompareError> {
        if self.token.is_cancelled() {
            return Ok(Comparison::Cancelled);
        }

        let mut left = File::open(a).map_err(|source| CompareError::Open {
            path: a.to_path_buf(),
            source,
        })?;
        let mut right = File::open(b).map_err(|source| CompareError::Open {
            path: b.to_path_buf(),
            source,
        })?;

        // Small files do not need a full chunk
        let buf_len = usize::try_from(expected)
            .unwrap_or(usize::MAX)
            .clamp(1, self.chunk_size);
        if self.left.len() < buf_len {
            self.left.resize(buf_len, 0);
            self.right.resize(buf_len, 0);
        }

        loop {
            if self.token.is_cancelled() {
                return Ok(Comparison::Cancelled);
            }

            let n_left =
                read_chunk(&mut left, &mut self.left[..buf_len]).map_err(|source| {
                    CompareError::Read {
                        path: a.to_path_buf(),
                        source,
                    }
                })?;
            let n_right =
                read_chunk(&mut right, &mut self.right[..buf_len]).map_err(|source| {
                    CompareError::Read {
                        path: b.to_path_buf(),
                        source,
                    }
                })?;

            if n_left != n_right {
                return Ok(Comparison::Different);
            }
            if n_left == 0 {
                return Ok(Comparison::Equal);
            }

            let windows = self.left[..n_left]
                .chunks(COMPARE_WINDOW)
                .zip(self.right[..n_right].chunks(COMPARE_WINDOW));
            for (l, r) in windows {
                if self.token.is_cancelled() {
                    return Ok(Comparison::Cancelled);
                }
                if l != r {
                    return Ok(Comparison::Different);
                }
            }
        }
    }
}

/// Fill `buf` from `reader`, stopping early only at end of file.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
