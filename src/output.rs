use crate::logging::Logger;
use crate::models::RunTotals;

/// Closing summary, printed after every run including dry runs.
pub fn log_summary(logger: &Logger, totals: &RunTotals, dry_run: bool) {
    logger.info("=== SUMMARY ===");
    logger.info(format!("Repositories touched: {}", totals.repositories));
    logger.info(format!(
        "Tags attempted: {} | Succeeded: {} | Failed: {}",
        totals.tags_attempted, totals.succeeded, totals.failed
    ));
    if dry_run {
        logger.info("Mode: DRY-RUN (no changes were made)");
    }
}
