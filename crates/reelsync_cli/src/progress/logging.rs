use reelsync::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::Discovering => {
                tracing::info!("Discovering movies");
            }

            SyncProgress::FetchedPage {
                page,
                count,
                total_so_far,
                total_pages,
            } => {
                tracing::debug!(page, total_pages, count, total_so_far, "Fetched page");
            }

            SyncProgress::DiscoveryComplete { total } => {
                tracing::info!(total, "Discovery complete");
            }

            SyncProgress::Deduplicated {
                existing,
                new_candidates,
            } => {
                tracing::info!(existing, new_candidates, "Skipping stored movies");
            }

            SyncProgress::FetchingChunk {
                chunk,
                chunks,
                size,
            } => {
                tracing::info!(chunk, chunks, size, "Fetching details");
            }

            SyncProgress::FetchedDetails { id, name } => {
                tracing::debug!(id, name = %name, "Fetched details");
            }

            SyncProgress::PersistingBatch { count } => {
                tracing::debug!(count, "Persisting batch");
            }

            SyncProgress::Persisted {
                inserted,
                skipped,
                failed,
            } => {
                if failed > 0 {
                    tracing::warn!(inserted, skipped, failed, "Batch persisted with failures");
                } else {
                    tracing::info!(inserted, skipped, "Batch persisted");
                }
            }

            SyncProgress::Throttled {
                context,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    request = %context,
                    retry_after_ms,
                    attempt,
                    "Rate limited, backing off"
                );
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
