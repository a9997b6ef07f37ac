//! Image records: digest a root, then attach file facts and capture metadata to each image.

use log::{debug, warn};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::RunError;
use crate::metadata::MetadataExtractor;
use crate::pipeline::{CancelToken, digest_root};
use crate::types::{CaptureMetadata, ImageRecord, Opts};

/// Digest every image under `root` and build one [`ImageRecord`] per image, sorted by path.
///
/// The digest run is all-or-nothing. Metadata is best-effort: an extractor error is logged and
/// the record keeps absent fields.
pub fn scan_dir(
    root: &Path,
    opts: &Opts,
    extractor: &dyn MetadataExtractor,
    cancel: Option<&CancelToken>,
) -> Result<Vec<ImageRecord>, RunError> {
    let digests = digest_root(root, opts, cancel, |_, _| {}).outcome?;
    debug!("{}: building {} records", root.display(), digests.len());

    let mut records = Vec::with_capacity(digests.len());
    for (rel, digest) in digests {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(RunError::Canceled);
        }
        let file_name = root.join(&rel);
        let meta = std::fs::metadata(&file_name).map_err(|source| RunError::Read {
            path: file_name.clone(),
            source,
        })?;
        let last_modified_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| i64::try_from(d.as_nanos()).ok())
            .unwrap_or(0);
        let metadata = if opts.with_metadata {
            extractor.extract(&file_name).unwrap_or_else(|e| {
                warn!("{}: metadata unavailable: {}", file_name.display(), e);
                CaptureMetadata::default()
            })
        } else {
            CaptureMetadata::default()
        };
        records.push(ImageRecord {
            file_name,
            size: meta.len(),
            last_modified_ns,
            digest,
            metadata,
        });
    }
    Ok(records)
}
