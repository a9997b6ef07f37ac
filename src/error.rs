//! Error taxonomy for a pipeline run.
//!
//! A run reports at most one of these. Skipped walk entries are not errors; they are
//! collected on the side and logged (see [`crate::pipeline::error_handler`]).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    /// Root does not exist. Short-circuits this root only.
    #[error("Root folder not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Root exists but is not a directory.
    #[error("Root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Traversal could not continue.
    #[error("walk failed{}: {message}", path_suffix(.path))]
    Walk {
        path: Option<PathBuf>,
        message: String,
    },

    /// The walk observed cancellation before it finished.
    #[error("walk canceled")]
    WalkCanceled,

    /// A worker could not read a candidate file.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller's cancellation token was raised.
    #[error("run canceled")]
    Canceled,

    /// The run's deadline passed.
    #[error("run exceeded its deadline")]
    DeadlineExceeded,

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

impl RunError {
    /// True for outcomes caused by cancellation rather than by a failure in the tree.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            RunError::WalkCanceled | RunError::Canceled | RunError::DeadlineExceeded
        )
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}
