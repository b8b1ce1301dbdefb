//! Human-readable output.
//!
//! ```text
//! searching...
//! clustering finished, now searching...
//! Size: 10
//!   Group 1
//!     A  /data/A
//!     B  /data/B
//!   Group 2
//!     C  /data/C
//! search complete!
//! 4 files (40 B) in 2 sizes, 1 duplicate group(s), 10 B reclaimable (25.0%)
//! ```
//!
//! A failed session prints nothing here; the caller reports the error once,
//! on stderr.
//!
//! Colors come from yansi and follow its global switch, so `--no-color`
//! only has to call [`yansi::disable`].

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::EventPrinter;
use crate::duplicates::DuplicateGroup;
use crate::events::{ScanOutcome, ScanReport};

/// Status line shown while traversal runs.
pub const STATUS_SEARCHING: &str = "searching...";
/// Status line shown once traversal is done and clustering runs.
pub const STATUS_CLUSTERING: &str = "clustering finished, now searching...";
/// Status line for a completed session.
pub const STATUS_COMPLETE: &str = "search complete!";
/// Status line for a cancelled session.
pub const STATUS_CANCELLED: &str = "search cancelled";

/// Text printer over any writer.
pub struct TextOutput<W: Write> {
    writer: W,
    show_summary: bool,
}

impl<W: Write> TextOutput<W> {
    /// Create a printer that also writes the closing summary line.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            show_summary: true,
        }
    }

    /// Choose whether the closing summary line is written.
    #[must_use]
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventPrinter for TextOutput<W> {
    fn started(&mut self, _root: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", STATUS_SEARCHING.dim())
    }

    fn groups_found(&mut self, size: u64, groups: &[DuplicateGroup]) -> io::Result<()> {
        // Bucket keys are exact; the human form is only a hint
        if size >= 1024 {
            writeln!(
                self.writer,
                "{} {} {}",
                "Size:".bold(),
                size.bold().cyan(),
                format!("({})", ByteSize::b(size)).dim()
            )?;
        } else {
            writeln!(self.writer, "{} {}", "Size:".bold(), size.bold().cyan())?;
        }

        for (index, group) in groups.iter().enumerate() {
            let header = format!("Group {}", index + 1);
            if group.is_duplicate() {
                writeln!(self.writer, "  {}", header.yellow())?;
            } else {
                writeln!(self.writer, "  {}", header.dim())?;
            }
            for file in group.files() {
                writeln!(
                    self.writer,
                    "    {}  {}",
                    file.name.green(),
                    file.path.display()
                )?;
            }
        }

        self.writer.flush()
    }

    fn traversal_complete(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", STATUS_CLUSTERING.dim())
    }

    fn finished(&mut self, report: &ScanReport) -> io::Result<()> {
        match &report.outcome {
            ScanOutcome::Completed => writeln!(self.writer, "{}", STATUS_COMPLETE.green())?,
            ScanOutcome::Cancelled => writeln!(self.writer, "{}", STATUS_CANCELLED.yellow())?,
            ScanOutcome::Failed(_) => return self.writer.flush(),
        }

        if self.show_summary {
            let summary = &report.summary;
            writeln!(
                self.writer,
                "{} files ({}) in {} sizes, {} duplicate group(s), {} reclaimable ({:.1}%)",
                summary.total_files,
                summary.total_size_display(),
                summary.buckets,
                summary.duplicate_groups,
                summary.reclaimable_display().bold(),
                summary.wasted_percentage()
            )?;
            let unreadable = summary.skipped_entries + summary.failed_comparisons;
            if unreadable > 0 {
                writeln!(
                    self.writer,
                    "{}",
                    format!("{} unreadable entries or comparisons skipped", unreadable).yellow()
                )?;
            }
        }

        self.writer.flush()
    }
}
