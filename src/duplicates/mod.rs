//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file bucketing
//! - Chunked byte-exact comparison
//! - Representative-based clustering of each bucket
//! - The finder that runs the whole pipeline on a worker pool

pub mod cluster;
pub mod compare;
pub mod finder;
pub mod groups;

pub use cluster::{cluster_bucket, ClusterOutcome};
pub use compare::{CompareError, Comparator, Comparison, DEFAULT_CHUNK_SIZE};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeBucket};
