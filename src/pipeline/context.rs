//! Pipeline context and tuning: shared data passed into the walk thread and the channels that connect the stages.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::error::RunError;
use crate::types::{DigestResult, Opts};
use crate::utils::config::WorkerConsts;

/// Tuning derived from [`Opts`]: worker count and channel cap.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity for path and result channels. 0 = rendezvous.
    pub channel_cap: usize,
}

impl From<&Opts> for PipelineTuning {
    fn from(opts: &Opts) -> Self {
        Self {
            num_workers: opts.num_workers.clamp(1, WorkerConsts::MAX_NUM_WORKERS),
            channel_cap: opts.channel_cap,
        }
    }
}

/// Shared context for the walk. Built in `run_pipeline` and moved into the walk thread.
pub struct PipelineContext {
    pub root: PathBuf,
    /// Lower-cased extensions without the dot.
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub strict: bool,
}

/// A walk entry that could not be visited and was skipped instead of aborting the run.
#[derive(Clone, Debug)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Terminal outcome of the walk: number of paths emitted, or why traversal stopped.
pub type WalkResult = Result<usize, RunError>;

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive results, then read the walk slot and join.
pub struct PipelineHandles {
    pub result_rx: Receiver<DigestResult>,
    /// Holds exactly one [`WalkResult`]. Read only after `result_rx` is closed.
    pub walk_outcome_rx: Receiver<WalkResult>,
    pub skip_rx: Receiver<SkippedEntry>,
    pub walk_handle: JoinHandle<()>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Channels for the pipeline. Walk thread gets path_tx, skip_tx, walk_outcome_tx, ctx; workers get path_rx, result_tx.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub result_tx: Sender<DigestResult>,
    pub result_rx: Receiver<DigestResult>,
    pub skip_tx: Sender<SkippedEntry>,
    pub skip_rx: Receiver<SkippedEntry>,
    pub walk_outcome_tx: Sender<WalkResult>,
    pub walk_outcome_rx: Receiver<WalkResult>,
    pub ctx: PipelineContext,
}

pub fn create_pipeline_channels(root: &Path, opts: &Opts, channel_cap: usize) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(channel_cap);
    let (result_tx, result_rx) = bounded::<DigestResult>(channel_cap);
    let (skip_tx, skip_rx) = unbounded::<SkippedEntry>();
    // One slot so the walk never blocks publishing its outcome.
    let (walk_outcome_tx, walk_outcome_rx) = bounded::<WalkResult>(1);

    let ctx = PipelineContext {
        root: root.to_path_buf(),
        extensions: opts
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect(),
        exclude: opts.exclude.clone(),
        strict: opts.strict,
    };

    PipelineChannels {
        path_tx,
        path_rx,
        result_tx,
        result_rx,
        skip_tx,
        skip_rx,
        walk_outcome_tx,
        walk_outcome_rx,
        ctx,
    }
}
