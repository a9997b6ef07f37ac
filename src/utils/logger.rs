use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the env_logger backend. Dependencies log at WARN; this crate at INFO, or DEBUG when `verbose`.
/// `RUST_LOG` still overrides both. Safe to call more than once; later calls are ignored.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .parse_default_env()
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            // `snookr::pipeline::walk` -> `pipeline::walk`
            let target = record
                .target()
                .strip_prefix(name)
                .map(|t| t.trim_start_matches("::"))
                .unwrap_or(record.target());
            let line = match record.level() {
                Level::Error => format!("[{} {} {}] {}", name.cyan(), "ERROR".red(), target.white(), record.args()),
                Level::Warn => format!("[{} {} {}] {}", name.cyan(), "WARN".yellow(), target.white(), record.args()),
                Level::Debug | Level::Trace => {
                    format!("[{} {}] {}", name.cyan(), target.dimmed(), record.args())
                }
                Level::Info => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
