//! Pipeline components: cancellation, context, walk, digest workers, fan-in, orchestration.

pub mod cancel;
pub mod collect;
pub mod context;
pub mod digest;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;

pub use cancel::{CancelCause, CancelToken, RunScope};
pub use collect::collect_digests;
pub use context::{
    PipelineChannels, PipelineContext, PipelineHandles, PipelineTuning, SkippedEntry, WalkResult,
    create_pipeline_channels,
};
pub use digest::spawn_digest_workers;
pub use error_handler::report_skipped_entries;
pub use orchestrator::{check_root, digest_root, run_pipeline, shutdown_pipeline_handles};
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
