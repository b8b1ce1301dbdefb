//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which validates a root path
//! and then lazily yields a [`FileDescriptor`] for every regular file below
//! it. Traversal is single-threaded and sorted by file name so that two
//! walks over an unmodified tree visit files in the same order.
//!
//! # Policy
//!
//! - Symbolic links are never followed and never reported (no cycles)
//! - Special files (sockets, FIFOs, devices) are skipped
//! - An unreadable entry is logged, counted and skipped
//! - Failing to open the root aborts the walk with a [`ScanError`]
//! - The cancellation token is checked before every step
//!
//! # Example
//!
//! ```no_run
//! use copyfinder::cancel::CancellationToken;
//! use copyfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let mut files = walker.walk(&CancellationToken::new()).unwrap();
//! let found: Vec<_> = files.by_ref().collect();
//! println!("{} files, {} entries skipped", found.len(), files.skipped());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{FileDescriptor, ScanError, WalkerConfig};
use crate::cancel::CancellationToken;

/// Directory walker for file discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The path is not touched until [`Walker::walk`] is called.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Open the root and return a lazy iterator over its regular files.
    ///
    /// Each call starts a fresh traversal.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root does not exist, is not a directory,
    /// or cannot be opened for listing.
    pub fn walk(&self, token: &CancellationToken) -> Result<Files, ScanError> {
        let root = std::path::absolute(&self.root)
            .map_err(|e| ScanError::from_io(self.root.clone(), e))?;

        let metadata = fs::metadata(&root).map_err(|e| ScanError::from_io(root.clone(), e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root));
        }

        // Probe the listing so an unreadable root fails the session up front
        // instead of surfacing as a skipped entry.
        fs::read_dir(&root).map_err(|e| ScanError::from_io(root.clone(), e))?;

        log::debug!("Walking {}", root.display());

        let inner = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Files {
            inner,
            config: self.config.clone(),
            token: token.clone(),
            skipped: 0,
            stopped: false,
        })
    }
}

/// Lazy sequence of regular files produced by [`Walker::walk`].
pub struct Files {
    inner: walkdir::IntoIter,
    config: WalkerConfig,
    token: CancellationToken,
    skipped: usize,
    stopped: bool,
}

impl Files {
    /// Number of entries skipped because their metadata could not be read.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether iteration ended early because of cancellation.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.stopped
    }

    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }
}

impl Iterator for Files {
    type Item = FileDescriptor;

    fn next(&mut self) -> Option<FileDescriptor> {
        loop {
            if self.stopped {
                return None;
            }
            if self.token.is_cancelled() {
                log::debug!("Walker: cancellation requested, stopping iteration");
                self.stopped = true;
                return None;
            }

            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map_or_else(PathBuf::new, Path::to_path_buf);
                    log::warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    self.skipped += 1;
                    continue;
                }
            };

            if self.config.skip_hidden && is_hidden(&entry) {
                log::trace!("Skipping hidden entry: {}", entry.path().display());
                if entry.file_type().is_dir() {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                log::trace!("Skipping symlink: {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path().display(), e);
                    self.skipped += 1;
                    continue;
                }
            };

            let size = metadata.len();
            if !self.passes_size_filter(size) {
                log::trace!(
                    "Skipping file due to size filter ({}): {}",
                    size,
                    entry.path().display()
                );
                continue;
            }

            return Some(FileDescriptor::new(entry.into_path(), size));
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
