//! Fan-in: drain the merged result stream into a path → digest map, stopping at the first error.

use crossbeam_channel::{Receiver, select};
use log::debug;
use std::path::Path;

use crate::error::RunError;
use crate::types::{Digest, DigestResult, Digests};

use super::cancel::{CancelCause, CancelToken};

/// Consume `result_rx` until it closes (every worker exited) or the token is raised.
///
/// `on_result` sees each successful digest in completion order. On the first failed result the
/// token is raised with [`CancelCause::Failed`], the partial map is dropped, and the error is
/// returned without waiting for the remaining workers. If the token is raised by someone else the
/// partial map is returned; the caller decides what the cancellation means.
pub fn collect_digests<F>(
    result_rx: &Receiver<DigestResult>,
    root: &Path,
    cancel: &CancelToken,
    mut on_result: F,
) -> Result<Digests, RunError>
where
    F: FnMut(&Path, &Digest),
{
    let mut digests = Digests::new();
    loop {
        let next = select! {
            recv(result_rx) -> msg => msg.ok(),
            recv(cancel.done()) -> _ => None,
        };
        let Some(DigestResult { path, outcome }) = next else {
            break;
        };
        match outcome {
            Ok(digest) => {
                on_result(&path, &digest);
                digests.insert(path, digest);
            }
            Err(source) => {
                cancel.cancel(CancelCause::Failed);
                return Err(RunError::Read {
                    path: root.join(path),
                    source,
                });
            }
        }
    }
    debug!("collector: stream closed, {} digests", digests.len());
    Ok(digests)
}
