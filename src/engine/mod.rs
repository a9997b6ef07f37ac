//! Engine module: hashing, path filters, rendering and the command line around the pipeline

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod output;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{Hasher, hash_bytes, hash_file, hash_reader};
pub use output::{write_record, write_records};
pub use tools::{glob_match, has_image_extension, path_relative_to, should_digest};
