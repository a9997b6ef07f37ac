//! Load `.snookr.toml` from a directory (CLI only). Lib does not use this; the consuming program passes [`Opts`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::types::DigestAlgorithm;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SnookrToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    workers: Option<usize>,
    algorithm: Option<DigestAlgorithm>,
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    strict: Option<bool>,
    channel_cap: Option<usize>,
    timeout: Option<u64>,
    metadata: Option<bool>,
    pub(crate) json: Option<bool>,
    pub(crate) verbose: Option<bool>,
}

impl SnookrToml {
    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Load `.snookr.toml` from `dir`. `Ok(None)` if the file is missing; `Err` if it is unreadable or malformed.
pub(crate) fn load_snookr_toml(dir: &Path) -> Result<Option<SnookrToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let file = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &SnookrToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, workers => num_workers);
    apply_file_opt!(s, opts, algorithm => algorithm);
    apply_file_opt!(s, opts, extensions => extensions);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, strict => strict);
    apply_file_opt!(s, opts, channel_cap => channel_cap);
    apply_file_opt!(s, opts, metadata => with_metadata);
    if let Some(secs) = s.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
}
