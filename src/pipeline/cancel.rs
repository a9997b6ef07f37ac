//! Write-once broadcast cancellation shared by every stage of a run.
//!
//! Raising a token records its cause and drops the only sender of the `done` channel, so every
//! stage blocked in a `select!` on [`CancelToken::done`] wakes immediately. Stages that are busy
//! (a worker mid-read) poll [`CancelToken::is_cancelled`] between units of work.

use crossbeam_channel::{Receiver, Sender, after, bounded, never, select};
use log::debug;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Why a token was raised. The first cause wins; later raises are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelCause {
    /// The run finished and is releasing stragglers.
    Finished,
    /// A stage reported the run's decisive error.
    Failed,
    /// The caller (or a parent token) asked the run to stop.
    External,
    /// The run's deadline passed.
    Deadline,
}

struct Inner {
    cause: OnceLock<CancelCause>,
    done_tx: Mutex<Option<Sender<()>>>,
    done_rx: Receiver<()>,
}

/// Cloneable handle to one cancellation signal. `active` until the first [`cancel`](Self::cancel), then `canceled` for good.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cause", &self.cause())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        // Nothing is ever sent; the channel only exists to be disconnected.
        let (done_tx, done_rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cause: OnceLock::new(),
                done_tx: Mutex::new(Some(done_tx)),
                done_rx,
            }),
        }
    }

    /// Raise the signal. Returns true if this call raised it, false if it was already raised.
    pub fn cancel(&self, cause: CancelCause) -> bool {
        if self.inner.cause.set(cause).is_err() {
            return false;
        }
        let mut tx = self
            .inner
            .done_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tx.take();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cause.get().is_some()
    }

    pub fn cause(&self) -> Option<CancelCause> {
        self.inner.cause.get().copied()
    }

    /// Receiver that becomes ready (disconnected) once the token is raised. Use in `select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done_rx
    }
}

/// Cancellation scope of one run: a fresh token, optionally chained to a parent token and a deadline.
///
/// The parent can cancel the run; the run never cancels the parent. A watcher thread bridges the
/// two and exits as soon as either side is raised, so [`RunScope::finish`] never leaks it.
pub struct RunScope {
    token: CancelToken,
    watcher: Option<JoinHandle<()>>,
}

impl RunScope {
    pub fn new(parent: Option<&CancelToken>, deadline: Option<Duration>) -> Self {
        let token = CancelToken::new();
        if parent.is_some_and(CancelToken::is_cancelled) {
            token.cancel(CancelCause::External);
            return Self {
                token,
                watcher: None,
            };
        }
        if parent.is_none() && deadline.is_none() {
            return Self {
                token,
                watcher: None,
            };
        }

        let parent_done = parent
            .map(|p| p.done().clone())
            .unwrap_or_else(never::<()>);
        let timer = deadline.map(after).unwrap_or_else(never);
        let child = token.clone();
        let watcher = thread::spawn(move || {
            select! {
                recv(parent_done) -> _ => {
                    if child.cancel(CancelCause::External) {
                        debug!("run canceled by parent token");
                    }
                }
                recv(timer) -> _ => {
                    if child.cancel(CancelCause::Deadline) {
                        debug!("run deadline reached");
                    }
                }
                recv(child.done()) -> _ => {}
            }
        });
        Self {
            token,
            watcher: Some(watcher),
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Raise the run token (no-op if already raised) and wait for the watcher to exit.
    pub fn finish(mut self, cause: CancelCause) {
        self.token.cancel(cause);
        if let Some(w) = self.watcher.take() {
            let _ = w.join();
        }
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        self.token.cancel(CancelCause::Finished);
        if let Some(w) = self.watcher.take() {
            let _ = w.join();
        }
    }
}
