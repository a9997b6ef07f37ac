//! Path and filter utilities

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path as a display string with forward slashes (stable across platforms in output and JSON).
pub fn path_to_display_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// macOS AppleDouble sidecars (`._IMG_0001.JPG`) carry the image's extension but no image data.
pub fn is_resource_fork(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with("._"))
}

/// True if the lower-cased extension of `path` is one of `extensions` (already lower-cased, no dot).
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| extensions.iter().any(|x| *x == e))
}

/// True if an entry name matches any exclude pattern.
pub fn is_excluded(name: &OsStr, exclude_patterns: &[String]) -> bool {
    if exclude_patterns.is_empty() {
        return false;
    }
    let Some(name) = name.to_str() else {
        return false;
    };
    exclude_patterns.iter().any(|p| glob_match(p, name))
}

/// Returns true if a regular file found by the walk is a candidate for digesting.
pub fn should_digest(path: &Path, extensions: &[String], exclude_patterns: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    !is_resource_fork(name)
        && !is_excluded(name, exclude_patterns)
        && has_image_extension(path, extensions)
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_match_chars(&p, &t)
}

fn glob_match_chars(p: &[char], t: &[char]) -> bool {
    match p.split_first() {
        None => t.is_empty(),
        Some(('*', rest)) => (0..=t.len()).any(|i| glob_match_chars(rest, &t[i..])),
        Some(('?', rest)) => !t.is_empty() && glob_match_chars(rest, &t[1..]),
        Some((c, rest)) => t.first() == Some(c) && glob_match_chars(rest, &t[1..]),
    }
}
