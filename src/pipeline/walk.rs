//! Path producer: walks the root in lexical order and hands qualifying files to the workers.

use crossbeam_channel::{Sender, select};
use log::debug;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::engine::tools::{is_excluded, should_digest};
use crate::error::RunError;

use super::cancel::CancelToken;
use super::context::{PipelineContext, SkippedEntry, WalkResult};

/// One result from a directory walk: a regular file to consider, or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err {
        msg: String,
        path: Option<PathBuf>,
        /// Traversal cannot continue past this error.
        fatal: bool,
    },
}

/// Convert a walkdir result into [`WalkOutcome`]. Directories, symlinks and other non-regular entries yield `None`.
/// An error on the root itself (depth 0) is fatal; deeper errors only lose that entry.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<WalkOutcome> {
    match r {
        Ok(entry) => entry
            .file_type()
            .is_file()
            .then(|| WalkOutcome::Ok(entry.into_path())),
        Err(err) => Some(WalkOutcome::Err {
            msg: err
                .io_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| err.to_string()),
            path: err.path().map(PathBuf::from),
            fatal: err.depth() == 0,
        }),
    }
}

fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use walkdir::WalkDir;
    let exclude = ctx.exclude.clone();
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !is_excluded(e.file_name(), &exclude))
            .filter_map(to_outcome_walkdir),
    )
}

pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    skip_tx: Sender<SkippedEntry>,
    walk_outcome_tx: Sender<WalkResult>,
    ctx: PipelineContext,
    cancel: CancelToken,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        let outcome = run_walk_loop(&path_tx, &skip_tx, &ctx, &cancel, iter);
        match &outcome {
            Ok(count) => debug!("walk: done, {} candidate paths", count),
            Err(e) => debug!("walk: stopped: {}", e),
        }
        // Close the path stream first: workers drain, then the orchestrator reads the slot.
        drop(path_tx);
        let _ = walk_outcome_tx.send(outcome);
    })
}

/// Run the walk loop: consume `iter`, filter with `should_digest`, and offer each candidate on `path_tx`.
///
/// Every send also watches the cancel token, so a raise unblocks the walk even when no worker is
/// ready. Non-fatal errors go to `skip_tx` unless `ctx.strict`, in which case they end the walk.
/// Returns the count of paths sent.
pub fn run_walk_loop<I>(
    path_tx: &Sender<PathBuf>,
    skip_tx: &Sender<SkippedEntry>,
    ctx: &PipelineContext,
    cancel: &CancelToken,
    iter: I,
) -> WalkResult
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        if cancel.is_cancelled() {
            return Err(RunError::WalkCanceled);
        }
        match outcome {
            WalkOutcome::Ok(path) => {
                if !should_digest(&path, &ctx.extensions, &ctx.exclude) {
                    continue;
                }
                let sent = select! {
                    send(path_tx, path) -> res => res.is_ok(),
                    recv(cancel.done()) -> _ => false,
                };
                if !sent {
                    // Either canceled or every worker is gone; both end the walk early.
                    return Err(RunError::WalkCanceled);
                }
                count += 1;
            }
            WalkOutcome::Err { msg, path, fatal } => {
                if fatal || ctx.strict {
                    return Err(RunError::Walk { path, message: msg });
                }
                // Reported once, after the walk is joined.
                let _ = skip_tx.send(SkippedEntry { path, message: msg });
            }
        }
    }
    Ok(count)
}
