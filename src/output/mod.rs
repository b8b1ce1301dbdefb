//! Output formatters for streamed scan events.
//!
//! A session is printed while it runs: one call per [`ScanEvent`] in arrival
//! order. Bucket batches arrive in completion order, so neither format
//! promises any ordering between sizes.
//!
//! - [`TextOutput`] for people, colored with yansi
//! - [`JsonOutput`] for scripts: one JSON object per line
//!
//! # Example
//!
//! ```no_run
//! use copyfinder::controller::ScanController;
//! use copyfinder::duplicates::FinderConfig;
//! use copyfinder::output::{EventPrinter, TextOutput};
//!
//! let (controller, events) = ScanController::new(FinderConfig::default());
//! controller.start("/some/path").unwrap();
//!
//! let mut printer = TextOutput::new(std::io::stdout());
//! for event in events.iter() {
//!     if printer.print_event(&event).unwrap() {
//!         break;
//!     }
//! }
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;

use std::io;

use crate::duplicates::DuplicateGroup;
use crate::events::{Phase, ScanEvent, ScanReport};

/// Writes scan events as they arrive.
pub trait EventPrinter {
    /// Called once, right after the session was started.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn started(&mut self, _root: &str) -> io::Result<()> {
        Ok(())
    }

    /// One completed size bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn groups_found(&mut self, size: u64, groups: &[DuplicateGroup]) -> io::Result<()>;

    /// Traversal has finished and clustering begins.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn traversal_complete(&mut self) -> io::Result<()>;

    /// The session has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn finished(&mut self, report: &ScanReport) -> io::Result<()>;

    /// Dispatch one event. Returns `true` once the session has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn print_event(&mut self, event: &ScanEvent) -> io::Result<bool> {
        match event {
            ScanEvent::GroupsFound { size, groups } => {
                self.groups_found(*size, groups)?;
                Ok(false)
            }
            ScanEvent::PhaseChanged(Phase::TraversalComplete) => {
                self.traversal_complete()?;
                Ok(false)
            }
            ScanEvent::PhaseChanged(Phase::Finished(report)) => {
                self.finished(report)?;
                Ok(true)
            }
        }
    }
}
