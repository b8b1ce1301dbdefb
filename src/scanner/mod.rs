//! Scanner module for directory traversal.
//!
//! This module provides functionality for:
//! - Lazy, single-threaded directory walking using walkdir
//! - The [`FileDescriptor`] record handed to the bucketing phase
//! - Scan error classification (root failures vs. per-entry failures)
//!
//! # Example
//!
//! ```no_run
//! use copyfinder::cancel::CancellationToken;
//! use copyfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let token = CancellationToken::new();
//!
//! for file in walker.walk(&token).expect("root should be readable") {
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! ```

pub mod walker;

use serde::Serialize;
use std::path::PathBuf;

pub use walker::{Files, Walker};

/// A regular file discovered during traversal.
///
/// Identity is the absolute path. Descriptors are immutable and are moved
/// from the walker into a size bucket and from there into a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileDescriptor {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Final path component, for display
    pub name: String,
}

impl FileDescriptor {
    /// Create a new descriptor, deriving the display name from the path.
    ///
    /// # Arguments
    ///
    /// * `path` - Absolute path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, size, name }
    }
}

/// Configuration for directory walking.
///
/// Everything is off by default: the walker reports every regular file.
/// Symbolic links are never followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl WalkerConfig {
    /// Set whether hidden entries are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, size: Option<u64>) -> Self {
        self.min_size = size;
        self
    }

    /// Set the maximum file size.
    #[must_use]
    pub fn with_max_size(mut self, size: Option<u64>) -> Self {
        self.max_size = size;
        self
    }
}

/// Errors that abort a scan before any file is produced.
///
/// Per-entry failures never surface as this type; the walker logs and
/// skips them.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when opening the root directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while opening the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while opening `path`.
    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}
