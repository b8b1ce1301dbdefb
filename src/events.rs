//! Events streamed from a scan to its consumer.
//!
//! The engine never talks to a display directly. It reports through the
//! [`ResultSink`] trait: one [`ScanEvent::GroupsFound`] per clustered size
//! bucket, as soon as that bucket is done, plus [`Phase`] transitions.
//! Bucket results arrive in completion order, which is not size order, so
//! consumers must accept out-of-order delivery.
//!
//! A `crossbeam_channel::Sender<ScanEvent>` is a ready-made sink; the
//! matching receiver can live on any thread.
//!
//! # Example
//!
//! ```
//! use copyfinder::events::{Phase, ResultSink, ScanEvent};
//!
//! let (tx, rx) = crossbeam_channel::unbounded::<ScanEvent>();
//! tx.phase_changed(Phase::TraversalComplete);
//!
//! assert!(matches!(
//!     rx.recv().unwrap(),
//!     ScanEvent::PhaseChanged(Phase::TraversalComplete)
//! ));
//! ```

use crossbeam_channel::Sender;

use crate::duplicates::{DuplicateGroup, FinderError, ScanSummary};

/// How a session ended.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Every bucket was clustered.
    Completed,
    /// Cancellation was requested before the run completed.
    Cancelled,
    /// The session could not start (bad root path, worker pool failure).
    Failed(FinderError),
}

impl ScanOutcome {
    /// Short lowercase label ("completed", "cancelled", "failed").
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether the run completed normally.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Final report carried by [`Phase::Finished`].
#[derive(Debug)]
pub struct ScanReport {
    /// How the session ended
    pub outcome: ScanOutcome,
    /// Counters gathered up to the end of the session
    pub summary: ScanSummary,
}

/// Phase transitions of a session.
#[derive(Debug)]
pub enum Phase {
    /// Traversal and bucketing are done; clustering starts.
    TraversalComplete,
    /// All clustering tasks have stopped. Always the last event of a session.
    Finished(ScanReport),
}

/// Everything a consumer can receive from a session.
#[derive(Debug)]
pub enum ScanEvent {
    /// All groups of one size bucket.
    GroupsFound {
        /// Byte size shared by every file in `groups`
        size: u64,
        /// Groups in creation order; the first member of each is its representative
        groups: Vec<DuplicateGroup>,
    },
    /// A phase transition.
    PhaseChanged(Phase),
}

/// Receiver of scan results.
///
/// Called from worker threads, possibly concurrently.
pub trait ResultSink: Send + Sync {
    /// Called once per clustered size bucket.
    fn groups_found(&self, size: u64, groups: Vec<DuplicateGroup>);

    /// Called on each phase transition.
    fn phase_changed(&self, phase: Phase);
}

impl ResultSink for Sender<ScanEvent> {
    fn groups_found(&self, size: u64, groups: Vec<DuplicateGroup>) {
        if self.send(ScanEvent::GroupsFound { size, groups }).is_err() {
            log::debug!("Event receiver dropped, discarding groups for size {}", size);
        }
    }

    fn phase_changed(&self, phase: Phase) {
        if self.send(ScanEvent::PhaseChanged(phase)).is_err() {
            log::debug!("Event receiver dropped, discarding phase event");
        }
    }
}
