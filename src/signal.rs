//! Signal handling for graceful shutdown.
//!
//! Ctrl+C does not kill the process. It runs the interrupt hook registered
//! with [`install_handler`], which normally cancels the running scan; the
//! scan then winds down through its cancellation checkpoints and reports a
//! cancelled outcome.
//!
//! `ctrlc` only accepts one process-wide handler, so the handler is installed
//! once and each call to [`install_handler`] just replaces the hook it runs.
//!
//! # Usage
//!
//! ```rust,no_run
//! use copyfinder::cancel::CancellationToken;
//! use copyfinder::signal::install_handler;
//!
//! let token = CancellationToken::new();
//! let hook_token = token.clone();
//! install_handler(move || hook_token.cancel()).expect("Failed to install signal handler");
//! ```
//!
//! # Exit Codes
//!
//! An interrupted scan exits with code 130 (128 + SIGINT), reported by
//! [`crate::error::ExitCode::Interrupted`].

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

type InterruptHook = Box<dyn Fn() + Send + 'static>;

static HOOK: Mutex<Option<InterruptHook>> = Mutex::new(None);
static INSTALLED: Mutex<bool> = Mutex::new(false);

fn lock<T>(slot: &'static Mutex<T>) -> MutexGuard<'static, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register `on_interrupt` to run on Ctrl+C, installing the process handler
/// on first use.
///
/// Replaces any hook registered earlier.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another Ctrl+C handler was
/// already registered outside this module. The hook stays registered and can
/// still be triggered by [`interrupt`].
pub fn install_handler<F>(on_interrupt: F) -> Result<(), SignalError>
where
    F: Fn() + Send + 'static,
{
    *lock(&HOOK) = Some(Box::new(on_interrupt));

    let mut installed = lock(&INSTALLED);
    if !*installed {
        ctrlc::set_handler(|| {
            // stderr is line-buffered, flush explicitly
            let _ = writeln!(std::io::stderr(), "\nInterrupted. Cancelling search...");
            let _ = std::io::stderr().flush();
            log::info!("Shutdown signal received");
            interrupt();
        })?;
        *installed = true;
        log::debug!("Ctrl+C handler installed");
    }

    Ok(())
}

/// Run the registered hook, as if Ctrl+C had been pressed.
///
/// Returns whether a hook was registered.
pub fn interrupt() -> bool {
    match lock(&HOOK).as_ref() {
        Some(hook) => {
            hook();
            true
        }
        None => false,
    }
}

/// Remove the registered hook. Later interrupts do nothing.
pub fn clear_handler() {
    lock(&HOOK).take();
}
