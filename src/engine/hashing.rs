//! File hashing utilities

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::pipeline::cancel::CancelToken;
use crate::types::{Digest, DigestAlgorithm};
use crate::utils::config::HashingConsts;

/// Incremental hasher for one [`DigestAlgorithm`].
pub enum Hasher {
    Md5(md5::Context),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            DigestAlgorithm::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize(self) -> Digest {
        match self {
            Hasher::Md5(ctx) => Digest::Md5(ctx.compute().0),
            Hasher::Blake3(h) => Digest::Blake3(*h.finalize().as_bytes()),
        }
    }
}

/// Digest an in-memory buffer.
pub fn hash_bytes(data: &[u8], algorithm: DigestAlgorithm) -> Digest {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Stream `reader` through the hasher in fixed chunks, checking `cancel` before each read.
/// Returns `Ok(None)` if cancellation was observed; the partial digest is discarded.
pub fn hash_reader<R: Read>(
    mut reader: R,
    algorithm: DigestAlgorithm,
    cancel: &CancelToken,
) -> io::Result<Option<Digest>> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(Some(hasher.finalize()))
}

/// Hash a file's full contents. The handle is closed on every return path, including cancellation.
pub fn hash_file(
    path: &Path,
    algorithm: DigestAlgorithm,
    cancel: &CancelToken,
) -> io::Result<Option<Digest>> {
    let file = File::open(path)?;
    hash_reader(file, algorithm, cancel)
}
