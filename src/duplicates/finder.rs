//! Duplicate finder: the traversal → bucketing → clustering pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder::run`] drives one session:
//! 1. **Traversal** - walk the root and bucket every regular file by size,
//!    on the calling thread
//! 2. **Barrier** - report [`Phase::TraversalComplete`]; the buckets are now
//!    complete and move into the worker pool
//! 3. **Clustering** - one rayon task per bucket; each task owns its bucket
//!    and its [`Comparator`], and reports its groups the moment it finishes
//!
//! The only state shared by the tasks is the cancellation token and a set
//! of atomic counters for the summary. Once the token is set, tasks that have
//! not started yet are skipped and running tasks stop at their next
//! checkpoint, reporting the groups they already formed.
//!
//! # Example
//!
//! ```no_run
//! use copyfinder::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_threads(Some(4)));
//! let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::cluster::cluster_bucket;
use super::compare::{Comparator, DEFAULT_CHUNK_SIZE};
use super::groups::{group_by_size, DuplicateGroup};
use crate::cancel::CancellationToken;
use crate::events::{Phase, ResultSink, ScanEvent, ScanOutcome, ScanReport};
use crate::progress::ProgressCallback;
use crate::scanner::{ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Worker threads for clustering. `None` uses rayon's default
    /// (one per logical CPU).
    pub threads: Option<usize>,
    /// Bytes read per file per comparison step.
    pub chunk_size: usize,
    /// Report one-member groups alongside real duplicates.
    pub report_singletons: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("threads", &self.threads)
            .field("chunk_size", &self.chunk_size)
            .field("report_singletons", &self.report_singletons)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            report_singletons: true,
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker thread count (`None` for rayon's default).
    #[must_use]
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.map(|n| n.max(1));
        self
    }

    /// Set the comparison chunk size in bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Choose whether one-member groups are reported.
    #[must_use]
    pub fn with_report_singletons(mut self, enabled: bool) -> Self {
        self.report_singletons = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a scan session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Regular files found during traversal
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of size buckets
    pub buckets: usize,
    /// Buckets whose clustering ran to completion
    pub buckets_clustered: usize,
    /// Groups delivered to the sink (including singletons when reported)
    pub groups_reported: usize,
    /// Groups with two or more members
    pub duplicate_groups: usize,
    /// Files beyond the first in each duplicate group
    pub duplicate_files: usize,
    /// Bytes held by those extra copies
    pub reclaimable_space: u64,
    /// Representative comparisons performed
    pub comparisons: usize,
    /// Entries skipped during traversal because their metadata was unreadable
    pub skipped_entries: usize,
    /// Comparisons that failed to open or read a file
    pub failed_comparisons: usize,
    /// Duration of the entire session
    pub scan_duration: Duration,
    /// Whether the session was cancelled
    pub interrupted: bool,
}

impl ScanSummary {
    /// Percentage of scanned bytes held by duplicate copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that end a session before clustering.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The clustering thread pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counters shared by the clustering tasks.
#[derive(Default)]
struct ClusterCounters {
    buckets_clustered: AtomicUsize,
    groups_reported: AtomicUsize,
    duplicate_groups: AtomicUsize,
    duplicate_files: AtomicUsize,
    reclaimable_space: AtomicU64,
    comparisons: AtomicUsize,
    failed_comparisons: AtomicUsize,
}

impl ClusterCounters {
    fn record(&self, groups: &[DuplicateGroup]) {
        self.groups_reported.fetch_add(groups.len(), Ordering::Relaxed);
        for group in groups.iter().filter(|g| g.is_duplicate()) {
            self.duplicate_groups.fetch_add(1, Ordering::Relaxed);
            self.duplicate_files
                .fetch_add(group.duplicate_count(), Ordering::Relaxed);
            self.reclaimable_space
                .fetch_add(group.wasted_space(), Ordering::Relaxed);
        }
    }

    fn write_into(&self, summary: &mut ScanSummary) {
        summary.buckets_clustered = self.buckets_clustered.load(Ordering::Relaxed);
        summary.groups_reported = self.groups_reported.load(Ordering::Relaxed);
        summary.duplicate_groups = self.duplicate_groups.load(Ordering::Relaxed);
        summary.duplicate_files = self.duplicate_files.load(Ordering::Relaxed);
        summary.reclaimable_space = self.reclaimable_space.load(Ordering::Relaxed);
        summary.comparisons = self.comparisons.load(Ordering::Relaxed);
        summary.failed_comparisons = self.failed_comparisons.load(Ordering::Relaxed);
    }
}

/// Duplicate finder that orchestrates the detection pipeline.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Run a session and report its end through the sink.
    ///
    /// Same as [`DuplicateFinder::run`] followed by
    /// [`Phase::Finished`]. Returns the outcome label for convenience.
    pub fn scan(
        &self,
        root: &Path,
        token: &CancellationToken,
        sink: &dyn ResultSink,
    ) -> &'static str {
        let report = self.run(root, token, sink);
        let label = report.outcome.label();
        sink.phase_changed(Phase::Finished(report));
        label
    }

    /// Run a session, streaming groups and the traversal phase to `sink`.
    ///
    /// Blocks until every clustering task has stopped. The final
    /// [`Phase::Finished`] event is left to the caller so it can update its
    /// own session state first; the report to send is returned.
    ///
    /// Never panics on I/O failures: unreadable entries are skipped,
    /// unreadable files never match, and a bad root yields
    /// [`ScanOutcome::Failed`] with no groups.
    pub fn run(
        &self,
        root: &Path,
        token: &CancellationToken,
        sink: &dyn ResultSink,
    ) -> ScanReport {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();
        let progress = self.config.progress_callback.as_deref();

        log::info!("Starting duplicate scan of {}", root.display());

        // Phase 1: traversal and bucketing on this thread
        let walker = Walker::new(root, self.config.walker_config.clone());
        let mut files = match walker.walk(token) {
            Ok(files) => files,
            Err(e) => {
                log::error!("Cannot scan {}: {}", root.display(), e);
                summary.scan_duration = start_time.elapsed();
                return ScanReport {
                    outcome: ScanOutcome::Failed(FinderError::Scan(e)),
                    summary,
                };
            }
        };

        if let Some(callback) = progress {
            callback.on_phase_start("walking", 0);
        }

        let mut seen = 0usize;
        let (buckets, stats) = group_by_size(files.by_ref().inspect(|file| {
            seen += 1;
            if let Some(callback) = progress {
                callback.on_progress(seen, file.path.to_string_lossy().as_ref());
            }
        }));

        summary.total_files = stats.total_files;
        summary.total_size = stats.total_size;
        summary.buckets = stats.unique_sizes;
        summary.skipped_entries = files.skipped();
        drop(files);

        if let Some(callback) = progress {
            callback.on_phase_end("walking");
        }

        log::info!(
            "Traversal complete: {} files ({}) in {} size buckets",
            summary.total_files,
            summary.total_size_display(),
            summary.buckets
        );
        sink.phase_changed(Phase::TraversalComplete);

        // Phase 2: one clustering task per bucket
        let outcome = if token.is_cancelled() {
            log::info!("Cancelled during traversal, skipping clustering");
            ScanOutcome::Cancelled
        } else {
            match self.cluster_all(buckets, token, sink, &summary) {
                Ok(counters) => {
                    counters.write_into(&mut summary);
                    if token.is_cancelled() {
                        ScanOutcome::Cancelled
                    } else {
                        ScanOutcome::Completed
                    }
                }
                Err(e) => {
                    log::error!("Clustering could not start: {}", e);
                    ScanOutcome::Failed(e)
                }
            }
        };

        summary.interrupted = matches!(outcome, ScanOutcome::Cancelled);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan {}: {} duplicate group(s), {} duplicate file(s), {} reclaimable",
            outcome.label(),
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        ScanReport { outcome, summary }
    }

    fn cluster_all(
        &self,
        buckets: Vec<super::SizeBucket>,
        token: &CancellationToken,
        sink: &dyn ResultSink,
        summary: &ScanSummary,
    ) -> Result<ClusterCounters, FinderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .thread_name(|i| format!("copyfinder-cluster-{i}"))
            .build()?;

        let counters = ClusterCounters::default();
        let progress = self.config.progress_callback.as_deref();
        let chunk_size = self.config.chunk_size;
        let report_singletons = self.config.report_singletons;

        if let Some(callback) = progress {
            callback.on_phase_start("clustering", summary.buckets);
        }
        log::info!(
            "Clustering {} bucket(s) on {} worker(s)",
            summary.buckets,
            pool.current_num_threads()
        );

        pool.install(|| {
            buckets
                .into_par_iter()
                .with_max_len(1)
                .for_each(|bucket| {
                    if token.is_cancelled() {
                        return;
                    }

                    let size = bucket.size;
                    let mut comparator = Comparator::new(chunk_size, token.clone());
                    let outcome = cluster_bucket(bucket, &mut comparator, token);

                    counters
                        .comparisons
                        .fetch_add(outcome.comparisons, Ordering::Relaxed);
                    counters
                        .failed_comparisons
                        .fetch_add(comparator.failures(), Ordering::Relaxed);

                    let groups: Vec<DuplicateGroup> = if report_singletons {
                        outcome.groups
                    } else {
                        outcome
                            .groups
                            .into_iter()
                            .filter(DuplicateGroup::is_duplicate)
                            .collect()
                    };

                    counters.record(&groups);
                    if !groups.is_empty() {
                        sink.groups_found(size, groups);
                    }

                    if !outcome.interrupted {
                        let done = counters.buckets_clustered.fetch_add(1, Ordering::Relaxed) + 1;
                        if let Some(callback) = progress {
                            callback.on_progress(done, &format!("{} byte bucket", size));
                        }
                    }
                });
        });

        if let Some(callback) = progress {
            callback.on_phase_end("clustering");
        }

        Ok(counters)
    }

    /// Scan `root` to completion and collect every reported group.
    ///
    /// Groups are returned sorted by size (largest first), then by the
    /// representative's path, which makes results comparable across runs.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the session failed to start.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let report = self.run(root, &CancellationToken::new(), &tx);
        drop(tx);

        if let ScanOutcome::Failed(e) = report.outcome {
            return Err(e);
        }

        let mut groups: Vec<DuplicateGroup> = rx
            .into_iter()
            .filter_map(|event| match event {
                ScanEvent::GroupsFound { groups, .. } => Some(groups),
                ScanEvent::PhaseChanged(_) => None,
            })
            .flatten()
            .collect();
        groups.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| a.representative().path.cmp(&b.representative().path))
        });

        Ok((groups, report.summary))
    }
}
