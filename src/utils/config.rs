//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Name of the optional settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker threads ----

/// Digest worker pool limits.
pub struct WorkerConsts;

impl WorkerConsts {
    /// Default number of concurrent digest workers per root.
    pub const DEFAULT_NUM_WORKERS: usize = 20;
    /// Hard ceiling so a typo on the command line cannot spawn thousands of threads.
    pub const MAX_NUM_WORKERS: usize = 512;
}

// ---- Hashing ----

/// Hashing I/O buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Chunk size for streaming reads (bytes). 1 MB. Cancellation is checked between chunks.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Discovery ----

/// Lower-cased extensions (without the dot) recognized as images by default.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Path and result channel capacity. Zero is a rendezvous channel: the walk can only hand a path
/// over when a worker is ready to take it.
pub const DEFAULT_CHANNEL_CAP: usize = 0;
