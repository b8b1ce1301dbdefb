//! Size bucketing and duplicate group structures.
//!
//! # Overview
//!
//! Size bucketing is the first phase of duplicate detection. Every file is
//! appended to the bucket keyed by its exact byte size, in traversal order.
//! Files with different sizes can never be duplicates, so content
//! comparison later only happens inside a bucket.
//!
//! Unlike a filter, the bucketer keeps every bucket, including buckets with a
//! single file and the bucket of empty files. Each one is clustered and
//! reported.
//!
//! # Example
//!
//! ```
//! use copyfinder::scanner::FileDescriptor;
//! use copyfinder::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileDescriptor::new(PathBuf::from("/file1.txt"), 1024),
//!     FileDescriptor::new(PathBuf::from("/file2.txt"), 1024),
//!     FileDescriptor::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(stats.unique_sizes, 2);
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::scanner::FileDescriptor;

/// Files sharing one exact byte size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size, in traversal order
    pub files: Vec<FileDescriptor>,
}

impl SizeBucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a bucket with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileDescriptor>) -> Self {
        Self { size, files }
    }

    /// Add a file to this bucket.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match bucket size.
    pub fn add(&mut self, file: FileDescriptor) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match bucket size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Files from one size bucket that are byte-for-byte identical.
///
/// The first member is the representative every later member was compared
/// against. A group may hold a single file but is never empty: it can only
/// be built around a representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by all members
    pub size: u64,
    files: Vec<FileDescriptor>,
}

impl DuplicateGroup {
    /// Start a group with its representative.
    #[must_use]
    pub fn new(representative: FileDescriptor) -> Self {
        Self {
            size: representative.size,
            files: vec![representative],
        }
    }

    /// The file later candidates are compared against.
    #[must_use]
    pub fn representative(&self) -> &FileDescriptor {
        &self.files[0]
    }

    /// Members in insertion order, representative first.
    #[must_use]
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Append a file proven equal to the representative.
    pub fn push(&mut self, file: FileDescriptor) {
        debug_assert_eq!(file.size, self.size);
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Never true for a group built through [`DuplicateGroup::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the group holds actual duplicates (2+ files).
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.files.len() > 1
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space held by the copies beyond the first.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from the bucketing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct sizes (one bucket each)
    pub unique_sizes: usize,
}

/// Partition files into size buckets.
///
/// Consumes the input on the calling thread and appends each file to the
/// bucket keyed by its exact size. Buckets are returned largest size first;
/// within a bucket, files keep their input order.
///
/// # Performance
///
/// - Time complexity: O(n) where n is the number of files
/// - No file I/O is performed (metadata only)
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileDescriptor>,
) -> (Vec<SizeBucket>, GroupingStats) {
    let mut by_size: HashMap<u64, Vec<FileDescriptor>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        by_size.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = by_size.len();

    let mut candidates = 0usize;
    let mut buckets: Vec<SizeBucket> = by_size
        .into_iter()
        .map(|(size, files)| {
            if files.len() > 1 {
                candidates += files.len();
                log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
            }
            SizeBucket::with_files(size, files)
        })
        .collect();

    // Larger files first: their comparisons take longest
    buckets.sort_by(|a, b| b.size.cmp(&a.size));

    log::info!(
        "Bucketing complete: {} files in {} size buckets ({} need comparison)",
        stats.total_files,
        stats.unique_sizes,
        candidates
    );

    (buckets, stats)
}
