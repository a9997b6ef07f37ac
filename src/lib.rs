//! Snookr: find images under one or more roots, fingerprint their content with a bounded pool of
//! digest workers, and attach EXIF capture metadata.

pub mod engine;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod scan;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::RunError;
pub use pipeline::{CancelCause, CancelToken};
pub use scan::scan_dir;
pub use types::*;

use log::debug;
use std::path::Path;

/// Digest every image under `root`. Returns the complete path → digest map, or the run's single error.
///
/// Keys are relative to `root`. A failed run never returns a partial map.
pub fn digest_dir(root: &Path, opts: &Opts) -> Result<Digests, RunError> {
    digest_dir_streaming(root, opts, None, |_, _| {})
}

/// Like [`digest_dir`], but the run stops with [`RunError::Canceled`] once `cancel` is raised.
/// Raising `cancel` from another thread unblocks every stage; all threads are joined before this returns.
pub fn digest_dir_with_cancel(
    root: &Path,
    opts: &Opts,
    cancel: &CancelToken,
) -> Result<Digests, RunError> {
    digest_dir_streaming(root, opts, Some(cancel), |_, _| {})
}

/// Single entry point with all hooks: optional external `cancel`, and `on_result` invoked for each
/// digest in completion order (which is not path order). Keep `on_result` fast or send to a channel.
pub fn digest_dir_streaming<F>(
    root: &Path,
    opts: &Opts,
    cancel: Option<&CancelToken>,
    on_result: F,
) -> Result<Digests, RunError>
where
    F: FnMut(&Path, &Digest),
{
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::digest_root(root, opts, cancel, on_result).outcome
}

/// Like [`digest_dir_with_cancel`], but also returns the entries the walk skipped as unreadable.
pub fn digest_dir_report(root: &Path, opts: &Opts, cancel: Option<&CancelToken>) -> RootReport {
    pipeline::digest_root(root, opts, cancel, |_, _| {})
}

/// Digest several roots one after another. Each root has its own cancellation scope: a failure
/// in one root never cancels another. Raising `cancel` stops the current root and every later one.
pub fn digest_roots<P: AsRef<Path>>(
    roots: &[P],
    opts: &Opts,
    cancel: Option<&CancelToken>,
) -> Vec<RootReport> {
    roots
        .iter()
        .map(|root| pipeline::digest_root(root.as_ref(), opts, cancel, |_, _| {}))
        .collect()
}
