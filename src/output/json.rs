//! JSON Lines output for streamed scan events.
//!
//! Every event becomes one compact JSON object on its own line, so a consumer
//! can process groups while the scan is still running.
//!
//! # Output Schema
//!
//! ```json
//! {"event":"started","root":"/data"}
//! {"event":"traversal_complete"}
//! {"event":"groups_found","size":10,"groups":[[{"name":"A","path":"/data/A"},{"name":"B","path":"/data/B"}],[{"name":"C","path":"/data/C"}]]}
//! {"event":"finished","outcome":"completed","error":null,"exit_code":0,"exit_code_name":"CF000","summary":{"total_files":4,"...":"..."}}
//! ```

use std::io::{self, Write};

use serde::Serialize;

use super::EventPrinter;
use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::events::{ScanOutcome, ScanReport};

/// A group member as `{name, path}`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile<'a> {
    /// Display name (last path component)
    pub name: &'a str,
    /// Absolute path
    pub path: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub buckets: usize,
    /// Groups reported, including singletons when shown
    pub groups_reported: usize,
    /// Number of groups with two or more files
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Representative comparisons performed
    pub comparisons: usize,
    /// Entries skipped because their metadata was unreadable
    pub skipped_entries: usize,
    /// Comparisons that failed on open or read
    pub failed_comparisons: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
}

impl From<&ScanSummary> for JsonSummary {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            buckets: summary.buckets,
            groups_reported: summary.groups_reported,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            comparisons: summary.comparisons,
            skipped_entries: summary.skipped_entries,
            failed_comparisons: summary.failed_comparisons,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            interrupted: summary.interrupted,
        }
    }
}

/// One output line.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JsonEvent<'a> {
    /// The session was started for `root`.
    Started {
        /// Root path as given
        root: &'a str,
    },
    /// Traversal finished.
    TraversalComplete,
    /// One completed size bucket.
    GroupsFound {
        /// Shared file size in bytes
        size: u64,
        /// Groups in creation order, each a list of members
        groups: Vec<Vec<JsonFile<'a>>>,
    },
    /// The session ended.
    Finished {
        /// "completed", "cancelled" or "failed"
        outcome: &'static str,
        /// Failure message for a failed session
        error: Option<String>,
        /// The exit code number
        exit_code: i32,
        /// The machine-readable exit code name (e.g., "CF000")
        exit_code_name: &'static str,
        /// Scan summary statistics
        summary: JsonSummary,
    },
}

impl<'a> JsonEvent<'a> {
    /// Build a `groups_found` line.
    #[must_use]
    pub fn groups_found(size: u64, groups: &'a [DuplicateGroup]) -> Self {
        let groups = groups
            .iter()
            .map(|group| {
                group
                    .files()
                    .iter()
                    .map(|f| JsonFile {
                        name: f.name.as_str(),
                        path: f.path.to_string_lossy().into_owned(),
                    })
                    .collect()
            })
            .collect();
        Self::GroupsFound { size, groups }
    }

    /// Build a `finished` line.
    #[must_use]
    pub fn finished(report: &ScanReport) -> Self {
        let summary = &report.summary;
        let exit_code = ExitCode::from_outcome(
            &report.outcome,
            summary.duplicate_groups,
            summary.skipped_entries + summary.failed_comparisons,
        );
        let error = match &report.outcome {
            ScanOutcome::Failed(e) => Some(e.to_string()),
            ScanOutcome::Completed | ScanOutcome::Cancelled => None,
        };

        Self::Finished {
            outcome: report.outcome.label(),
            error,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
            summary: JsonSummary::from(summary),
        }
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] io::Error),
}

impl From<JsonOutputError> for io::Error {
    fn from(err: JsonOutputError) -> Self {
        match err {
            JsonOutputError::Io(e) => e,
            JsonOutputError::Serialization(e) => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

/// JSON Lines printer over any writer.
pub struct JsonOutput<W: Write> {
    writer: W,
}

impl<W: Write> JsonOutput<W> {
    /// Create a printer writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one event as a line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_event(&mut self, event: &JsonEvent<'_>) -> Result<(), JsonOutputError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> EventPrinter for JsonOutput<W> {
    fn started(&mut self, root: &str) -> io::Result<()> {
        Ok(self.write_event(&JsonEvent::Started { root })?)
    }

    fn groups_found(&mut self, size: u64, groups: &[DuplicateGroup]) -> io::Result<()> {
        Ok(self.write_event(&JsonEvent::groups_found(size, groups))?)
    }

    fn traversal_complete(&mut self) -> io::Result<()> {
        Ok(self.write_event(&JsonEvent::TraversalComplete)?)
    }

    fn finished(&mut self, report: &ScanReport) -> io::Result<()> {
        Ok(self.write_event(&JsonEvent::finished(report))?)
    }
}
