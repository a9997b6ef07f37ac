use crossbeam_channel::{Receiver, select};
use log::debug;
use std::path::Path;
use std::thread::JoinHandle;

use crate::error::RunError;
use crate::pipeline::{self, CancelCause, CancelToken, RunScope, WalkResult};
use crate::types::{Digest, Digests, Opts, RootReport};

/// Start the walk + digest pipeline under `cancel`. Returns receivers and handles; caller receives
/// from `result_rx`, then reads `walk_outcome_rx`, and must join `walk_handle` and `worker_handles`.
pub fn run_pipeline(root: &Path, opts: &Opts, cancel: &CancelToken) -> pipeline::PipelineHandles {
    let tuning = pipeline::PipelineTuning::from(opts);
    debug!(
        "pipeline: {} digest workers ({:?}), channel cap {}",
        tuning.num_workers, opts.algorithm, tuning.channel_cap
    );

    let channels = pipeline::create_pipeline_channels(root, opts, tuning.channel_cap);

    let walk_handle = pipeline::spawn_walk_thread(
        channels.path_tx,
        channels.skip_tx,
        channels.walk_outcome_tx,
        channels.ctx,
        cancel.clone(),
    );

    let worker_handles = pipeline::spawn_digest_workers(
        channels.path_rx,
        &channels.result_tx,
        root,
        opts.algorithm,
        tuning.num_workers,
        cancel,
    );

    // Dropping the last outside sender lets the result stream close once every worker has exited.
    drop(channels.result_tx);

    pipeline::PipelineHandles {
        result_rx: channels.result_rx,
        walk_outcome_rx: channels.walk_outcome_rx,
        skip_rx: channels.skip_rx,
        walk_handle,
        worker_handles,
    }
}

/// Shut down the pipeline by joining walk and worker threads.
/// Only call after the run token is raised or the result stream has closed, so every thread is on its way out.
pub fn shutdown_pipeline_handles(
    walk_handle: JoinHandle<()>,
    worker_handles: Vec<JoinHandle<()>>,
) -> Result<(), RunError> {
    let mut panicked = None;
    if walk_handle.join().is_err() {
        panicked = Some(RunError::ThreadPanicked("walk"));
    }
    for h in worker_handles {
        if h.join().is_err() && panicked.is_none() {
            panicked = Some(RunError::ThreadPanicked("digest worker"));
        }
    }
    panicked.map_or(Ok(()), Err)
}

/// Validate that `root` exists and is a directory.
pub fn check_root(root: &Path) -> Result<(), RunError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RunError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RunError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(RunError::Walk {
            path: Some(root.to_path_buf()),
            message: e.to_string(),
        }),
    }
}

fn cancellation_error(cause: Option<CancelCause>) -> RunError {
    match cause {
        Some(CancelCause::External) => RunError::Canceled,
        Some(CancelCause::Deadline) => RunError::DeadlineExceeded,
        _ => RunError::WalkCanceled,
    }
}

/// After the result stream closed cleanly: decide between the collected map, a cancellation, and the walk's own error.
fn settle(
    digests: Digests,
    walk_outcome_rx: &Receiver<WalkResult>,
    token: &CancelToken,
) -> Result<Digests, RunError> {
    // Any raise before the stream closed may have abandoned in-flight paths; the map can't be trusted.
    if token.is_cancelled() {
        return Err(cancellation_error(token.cause()));
    }
    let walk: WalkResult = select! {
        recv(walk_outcome_rx) -> msg => msg.unwrap_or(Err(RunError::ThreadPanicked("walk"))),
        recv(token.done()) -> _ => Err(cancellation_error(token.cause())),
    };
    let count = walk?;
    debug_assert_eq!(count, digests.len());
    Ok(digests)
}

/// Main orchestrator: digest every candidate under `root`, all-or-nothing.
///
/// Walk → path channel → N digest workers → result channel → map. The run gets its own
/// cancellation scope, chained to `parent` and to `opts.timeout`. On the first read error the
/// scope is raised and the error returned; the walk's terminal outcome is consulted only after the
/// result stream is drained. Entries the walk could not visit come back in
/// [`RootReport::skipped`]. Every thread has been joined when this returns.
pub fn digest_root<F>(
    root: &Path,
    opts: &Opts,
    parent: Option<&CancelToken>,
    on_result: F,
) -> RootReport
where
    F: FnMut(&Path, &Digest),
{
    if let Err(e) = check_root(root) {
        return RootReport {
            root: root.to_path_buf(),
            outcome: Err(e),
            skipped: Vec::new(),
        };
    }
    let scope = RunScope::new(parent, opts.timeout);

    let pipeline::PipelineHandles {
        result_rx,
        walk_outcome_rx,
        skip_rx,
        walk_handle,
        worker_handles,
    } = run_pipeline(root, opts, scope.token());

    let outcome = pipeline::collect_digests(&result_rx, root, scope.token(), on_result)
        .and_then(|digests| {
            // The watcher may not have forwarded a parent raise yet.
            if parent.is_some_and(CancelToken::is_cancelled) {
                scope.token().cancel(CancelCause::External);
            }
            settle(digests, &walk_outcome_rx, scope.token())
        });

    // Success or failure, raise the scope so stragglers exit before joining.
    scope.token().cancel(match &outcome {
        Ok(_) => CancelCause::Finished,
        Err(_) => CancelCause::Failed,
    });
    drop(result_rx);
    let joined = shutdown_pipeline_handles(walk_handle, worker_handles);
    let skipped = pipeline::report_skipped_entries(&skip_rx);
    scope.finish(CancelCause::Finished);

    match &outcome {
        Ok(digests) => debug!("{}: {} digests", root.display(), digests.len()),
        Err(e) => debug!("{}: run failed: {}", root.display(), e),
    }
    RootReport {
        root: root.to_path_buf(),
        outcome: outcome.and_then(|digests| joined.map(|()| digests)),
        skipped,
    }
}
