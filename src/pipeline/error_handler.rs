use crossbeam_channel::Receiver;

use super::context::SkippedEntry;

/// Drain the walk's skip channel and log a summary: one warning with the count, each entry at debug.
/// Call after the walk thread has been joined. Returns the entries for the run's report.
pub fn report_skipped_entries(skip_rx: &Receiver<SkippedEntry>) -> Vec<SkippedEntry> {
    let skipped: Vec<SkippedEntry> = skip_rx.try_iter().collect();
    if !skipped.is_empty() {
        log::warn!(
            "Skipped {} entries due to permission errors or access issues",
            skipped.len()
        );
        for s in &skipped {
            log::debug!(
                "  skipped: {} ({})",
                s.path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown path>".to_string()),
                s.message
            );
        }
    }
    skipped
}
