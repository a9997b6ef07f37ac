//! Public and internal types for the snookr API and pipeline.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::tools::path_to_display_string;
use crate::error::RunError;
use crate::pipeline::SkippedEntry;
use crate::utils::config::{DEFAULT_CHANNEL_CAP, DEFAULT_IMAGE_EXTENSIONS, WorkerConsts};

/// Content hash function used by the digest workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// 128-bit MD5.
    #[default]
    Md5,
    /// 256-bit BLAKE3.
    Blake3,
}

/// Fixed-size fingerprint of a file's bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digest {
    Md5([u8; 16]),
    Blake3([u8; 32]),
}

impl Digest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        match self {
            Digest::Md5(_) => DigestAlgorithm::Md5,
            Digest::Blake3(_) => DigestAlgorithm::Blake3,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Digest::Md5(b) => b,
            Digest::Blake3(b) => b,
        }
    }

    /// Lower-case hex, the form `md5sum` / `b3sum` print.
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.algorithm(), self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Outcome of digesting one candidate path: either the digest or the read error, never both.
#[derive(Debug)]
pub struct DigestResult {
    /// Path relative to the root being digested.
    pub path: PathBuf,
    pub outcome: std::io::Result<Digest>,
}

/// Map of path (relative to the root) → content digest. Sorted by path.
pub type Digests = BTreeMap<PathBuf, Digest>;

/// Options for one pipeline run. Cheap to clone; the same options drive every root of a multi-root run.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Number of concurrent digest workers.
    pub num_workers: usize,
    pub algorithm: DigestAlgorithm,
    /// Recognized extensions, without the dot. Compared case-insensitively.
    pub extensions: Vec<String>,
    /// Exclude patterns (glob syntax, e.g. `.thumbnails`, `*_small.jpg`) matched on the entry name.
    pub exclude: Vec<String>,
    /// Strict mode: a per-entry walk error (permission, vanished entry) aborts the run instead of being skipped.
    pub strict: bool,
    /// Capacity of the path and result channels; 0 means hand-off only.
    pub channel_cap: usize,
    /// Deadline for the whole run of one root.
    pub timeout: Option<Duration>,
    /// Attach EXIF capture metadata when building records.
    pub with_metadata: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            num_workers: WorkerConsts::DEFAULT_NUM_WORKERS,
            algorithm: DigestAlgorithm::default(),
            extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: Vec::new(),
            strict: false,
            channel_cap: DEFAULT_CHANNEL_CAP,
            timeout: None,
            with_metadata: true,
        }
    }
}

/// Capture metadata attached to an image. Every field is independently present or absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CaptureMetadata {
    /// Capture time as `YYYY-MM-DDTHH:MM:SS` (local camera time, no zone).
    pub taken: Option<String>,
    pub camera: Option<String>,
    pub owner: Option<String>,
}

impl CaptureMetadata {
    pub fn is_empty(&self) -> bool {
        self.taken.is_none() && self.camera.is_none() && self.owner.is_none()
    }
}

/// One image found under a root: file facts, digest and capture metadata.
#[derive(Clone, Debug, Serialize)]
pub struct ImageRecord {
    /// Root joined with the relative path. Serialized lossily so non-UTF-8 names still render.
    #[serde(serialize_with = "serialize_display_path")]
    pub file_name: PathBuf,
    pub size: u64,
    /// Modification time in nanoseconds since epoch.
    pub last_modified_ns: i64,
    pub digest: Digest,
    #[serde(flatten)]
    pub metadata: CaptureMetadata,
}

fn serialize_display_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path_to_display_string(path))
}

/// Outcome of one root: the all-or-nothing digest map plus the entries the walk skipped.
#[derive(Debug)]
pub struct RootReport {
    pub root: PathBuf,
    pub outcome: Result<Digests, RunError>,
    /// Unreadable entries passed over on the way. Empty in strict mode, where they fail the run.
    pub skipped: Vec<SkippedEntry>,
}
