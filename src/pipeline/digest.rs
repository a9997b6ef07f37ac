//! Digest worker pool: N workers pull candidate paths first-come, hash them, and send one result each.

use crossbeam_channel::{Receiver, Sender, select};
use log::debug;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::hashing::hash_file;
use crate::engine::tools::path_relative_to;
use crate::types::{DigestAlgorithm, DigestResult};

use super::cancel::CancelToken;

/// Single digest worker: read paths from path_rx, hash, send on result_tx.
/// Exits when the path stream closes or the token is raised. A path in flight when the token is
/// raised is abandoned without a result.
fn digest_worker_loop(
    id: usize,
    path_rx: Receiver<PathBuf>,
    result_tx: Sender<DigestResult>,
    root: PathBuf,
    algorithm: DigestAlgorithm,
    cancel: CancelToken,
) {
    let mut processed = 0_usize;
    loop {
        let next = select! {
            recv(path_rx) -> msg => msg.ok(),
            recv(cancel.done()) -> _ => None,
        };
        let Some(abs_path) = next else { break };

        let outcome = match hash_file(&abs_path, algorithm, &cancel) {
            Ok(Some(digest)) => Ok(digest),
            Ok(None) => break,
            Err(e) => Err(e),
        };
        let path = path_relative_to(&abs_path, &root).unwrap_or(abs_path);
        let result = DigestResult { path, outcome };

        let sent = select! {
            send(result_tx, result) -> res => res.is_ok(),
            recv(cancel.done()) -> _ => false,
        };
        if !sent {
            break;
        }
        processed += 1;
    }
    debug!("digester {}: exit after {} files", id, processed);
}

/// Spawn `num_workers` digest workers. Each holds a clone of `result_tx`; the result channel closes
/// once the caller drops its own sender and every worker has exited.
pub fn spawn_digest_workers(
    path_rx: Receiver<PathBuf>,
    result_tx: &Sender<DigestResult>,
    root: &Path,
    algorithm: DigestAlgorithm,
    num_workers: usize,
    cancel: &CancelToken,
) -> Vec<JoinHandle<()>> {
    let root = root.to_path_buf();
    (0..num_workers)
        .map(|id| {
            let path_rx = path_rx.clone();
            let result_tx = result_tx.clone();
            let root = root.clone();
            let cancel = cancel.clone();
            thread::spawn(move || {
                digest_worker_loop(id, path_rx, result_tx, root, algorithm, cancel)
            })
        })
        .collect()
}
