//! Cooperative cancellation for scan sessions.
//!
//! A [`CancellationToken`] wraps an `AtomicBool` that only ever moves from
//! `false` to `true`. Every long-running call (walker, comparator, cluster
//! builder) receives a clone of the session's token and polls it at its
//! checkpoints. A fresh token is created for every session, so a token is
//! never reset.
//!
//! # Example
//!
//! ```
//! use copyfinder::cancel::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let worker_view = token.clone();
//!
//! assert!(!worker_view.is_cancelled());
//! token.cancel();
//! assert!(worker_view.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, monotonic cancellation flag for one scan session.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            log::debug!("Cancellation requested");
        }
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
