//! Session control: one background scan at a time.
//!
//! [`ScanController`] owns the event channel and at most one running
//! session. [`ScanController::start`] toggles: it launches a session when
//! idle and requests cancellation when one is running. Events for every
//! session arrive on the single receiver handed out by
//! [`ScanController::new`], and each session ends with exactly one
//! [`Phase::Finished`].
//!
//! The running flag is cleared *before* `Finished` is sent. A consumer that
//! reacts to `Finished` by calling `start` again therefore always launches a
//! fresh session instead of cancelling the one that just ended.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::cancel::CancellationToken;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::events::{Phase, ResultSink, ScanEvent};

/// What a call to [`ScanController::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was launched.
    Started,
    /// A session was already running; cancellation was requested instead.
    CancelRequested,
    /// The path was empty; nothing happened.
    NoPath,
}

struct Session {
    token: CancellationToken,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Session {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Scan thread panicked");
            }
        }
    }
}

/// Clears the running flag when the scan thread leaves the pipeline,
/// including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts, toggles, and cancels scan sessions.
pub struct ScanController {
    finder: DuplicateFinder,
    events: Sender<ScanEvent>,
    session: Mutex<Option<Session>>,
}

impl ScanController {
    /// Create a controller and the receiver its sessions report to.
    #[must_use]
    pub fn new(config: FinderConfig) -> (Self, Receiver<ScanEvent>) {
        let (events, rx) = crossbeam_channel::unbounded();
        let controller = Self {
            finder: DuplicateFinder::new(config),
            events,
            session: Mutex::new(None),
        };
        (controller, rx)
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a scan of `path`, or cancel the running one.
    ///
    /// - While a session runs, requests its cancellation and returns
    ///   [`StartOutcome::CancelRequested`]; `path` is ignored.
    /// - With an empty `path`, returns [`StartOutcome::NoPath`] and emits
    ///   nothing.
    /// - Otherwise launches a session on a background thread and returns
    ///   immediately.
    ///
    /// A path that does not exist still starts a session; it ends with a
    /// failed [`Phase::Finished`].
    ///
    /// # Errors
    ///
    /// Returns an error if the scan thread could not be spawned.
    pub fn start(&self, path: &str) -> io::Result<StartOutcome> {
        let mut slot = self.session();

        if let Some(session) = slot.as_ref().filter(|s| s.is_running()) {
            log::info!("Scan already running, requesting cancellation");
            session.token.cancel();
            return Ok(StartOutcome::CancelRequested);
        }

        if path.trim().is_empty() {
            log::warn!("No path given, nothing to scan");
            return Ok(StartOutcome::NoPath);
        }

        // The previous session has stopped; reap its thread
        if let Some(mut previous) = slot.take() {
            previous.join();
        }

        let root = PathBuf::from(path);
        let token = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));

        let finder = self.finder.clone();
        let events = self.events.clone();
        let thread_token = token.clone();
        let guard = RunningGuard(Arc::clone(&running));

        let handle = thread::Builder::new()
            .name("copyfinder-scan".to_string())
            .spawn(move || {
                let report = finder.run(&root, &thread_token, &events);
                drop(guard);
                events.phase_changed(Phase::Finished(report));
            })?;

        log::info!("Scan started for {}", path);
        *slot = Some(Session {
            token,
            running,
            handle: Some(handle),
        });

        Ok(StartOutcome::Started)
    }

    /// Request cancellation of the running session, if any.
    ///
    /// Returns immediately; the session reports
    /// [`Phase::Finished`] once its tasks have stopped.
    pub fn cancel(&self) {
        if let Some(session) = self.session().as_ref().filter(|s| s.is_running()) {
            session.token.cancel();
        }
    }

    /// Whether a session is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session().as_ref().is_some_and(Session::is_running)
    }

    /// Block until the current session's thread has exited.
    pub fn wait(&self) {
        if let Some(session) = self.session().as_mut() {
            session.join();
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        let slot = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.as_mut() {
            session.token.cancel();
            session.join();
        }
    }
}
