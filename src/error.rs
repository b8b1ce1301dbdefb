//! Structured error handling and exit codes.

use serde::Serialize;

use crate::events::ScanOutcome;

/// Exit codes for the copyfinder binary.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (bad root, bad configuration, unexpected failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (completed, but some entries or files were unreadable)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Scan completed but encountered some non-fatal errors.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CF000",
            Self::GeneralError => "CF001",
            Self::NoDuplicates => "CF002",
            Self::PartialSuccess => "CF003",
            Self::Interrupted => "CF130",
        }
    }

    /// Exit code for a finished session.
    ///
    /// `skipped` counts unreadable entries and failed comparisons.
    #[must_use]
    pub fn from_outcome(outcome: &ScanOutcome, duplicate_groups: usize, skipped: usize) -> Self {
        match outcome {
            ScanOutcome::Cancelled => Self::Interrupted,
            ScanOutcome::Failed(_) => Self::GeneralError,
            ScanOutcome::Completed if skipped > 0 => Self::PartialSuccess,
            ScanOutcome::Completed if duplicate_groups == 0 => Self::NoDuplicates,
            ScanOutcome::Completed => Self::Success,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
