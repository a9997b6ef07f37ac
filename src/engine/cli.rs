//! CLI command handler: scan each root independently and print its records.

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::output::write_records;
use crate::error::RunError;
use crate::metadata::{ExifConfig, ExifExtractor, MetadataExtractor, NoMetadata};
use crate::pipeline::{CancelCause, CancelToken};
use crate::scan::scan_dir;
use crate::types::ImageRecord;
use crate::utils::snookr_toml::{apply_file_to_opts, load_snookr_toml};
use crate::utils::setup_logging;
use crate::Opts;

/// Output flags that live outside the library [`Opts`].
struct Presentation {
    json: bool,
}

/// Build Opts: defaults, then `.snookr.toml` in the working directory, then CLI flags.
fn setup_opts(cli: &Cli) -> (Opts, Presentation) {
    let file = load_snookr_toml(Path::new("."));
    let settings = file.as_ref().ok().and_then(|f| f.as_ref()).map(|f| f.settings());
    let verbose = cli
        .verbose
        .or_else(|| settings.and_then(|s| s.verbose))
        .unwrap_or(false);
    setup_logging(verbose);

    let mut opts = Opts::default();
    match &file {
        Ok(Some(f)) => apply_file_to_opts(f, &mut opts),
        Ok(None) => {}
        Err(e) => warn!("{:#}; ignoring it", e),
    }

    if let Some(n) = cli.workers {
        opts.num_workers = n;
    }
    if let Some(a) = cli.algorithm {
        opts.algorithm = a;
    }
    if !cli.extensions.is_empty() {
        opts.extensions = cli.extensions.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(strict) = cli.strict {
        opts.strict = strict;
    }
    if let Some(secs) = cli.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    if cli.no_metadata {
        opts.with_metadata = false;
    }
    let json = cli
        .json
        .or_else(|| settings.and_then(|s| s.json))
        .unwrap_or(false);
    (opts, Presentation { json })
}

/// Print one root's records, or log why it produced none. Returns false if the root counts as failed.
fn report_root<W: Write>(
    out: &mut W,
    root: &Path,
    scanned: Result<Vec<ImageRecord>, RunError>,
    json: bool,
) -> bool {
    let records = match scanned {
        Ok(records) => records,
        Err(e) => {
            error!("{}: {}", root.display(), e);
            return false;
        }
    };
    let written = write_records(out, &records, json)
        .and_then(|()| out.flush())
        .with_context(|| format!("write output for {}", root.display()));
    match written {
        Ok(()) => {
            info!("Digested {} images under {}", records.len(), root.display());
            true
        }
        Err(e) => {
            error!("{:#}", e);
            false
        }
    }
}

/// Run every root. A missing or failing root is reported and the rest continue; returns an error if any root failed.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (opts, presentation) = setup_opts(cli);
    if cli.roots.is_empty() {
        bail!("Root folder(s) not specified.");
    }

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_handler.cancel(CancelCause::External);
    })
    .context("set Ctrl+C handler")?;

    let extractor: Box<dyn MetadataExtractor> = if opts.with_metadata {
        Box::new(ExifExtractor::new(ExifConfig::default()))
    } else {
        Box::new(NoMetadata)
    };

    let stdout = std::io::stdout();
    let mut failed = 0_usize;
    for root in &cli.roots {
        if cancel.is_cancelled() {
            warn!("Canceled; not starting {}", root.display());
            failed += 1;
            continue;
        }
        let scanned = scan_dir(root, &opts, extractor.as_ref(), Some(&cancel));
        if !report_root(&mut stdout.lock(), root, scanned, presentation.json) {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} roots failed", failed, cli.roots.len());
    }
    Ok(())
}
