//! Snookr CLI: digest images under each root and print their capture metadata.

use anyhow::Result;
use clap::Parser;
use snookr::engine::Cli;
use snookr::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
