use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use reelsync::sync::SyncProgress;

/// All mutable progress state, under one lock.
#[derive(Default)]
struct ProgressState {
    /// Discovery pages.
    discover_bar: Option<ProgressBar>,
    /// Detail fetches across all chunks.
    details_bar: Option<ProgressBar>,
    /// Rows written.
    save_bar: Option<ProgressBar>,
    /// Rows skipped or failed, for the save bar's message.
    skipped: u64,
    failed: u64,
}

/// Interactive progress reporter using indicatif.
///
/// Three bars, created as their phase starts:
/// - Discover: spinner until the first page reports `total_pages`
/// - Details: one bar over every new candidate
/// - Save: running count of inserted rows
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::Discovering => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb.set_prefix(format!("{:10}", "discover"));
                pb.set_message("Fetching discovery pages...");
                state.discover_bar = Some(pb);
            }

            SyncProgress::FetchedPage {
                page,
                total_so_far,
                total_pages,
                ..
            } => {
                if let Some(ref pb) = state.discover_bar {
                    if pb.length() != Some(u64::from(total_pages)) {
                        pb.set_length(u64::from(total_pages.max(1)));
                        pb.set_style(Self::bar_style());
                        pb.disable_steady_tick();
                    }
                    pb.set_position(u64::from(page));
                    pb.set_message(format!("{} movies", total_so_far));
                }
            }

            SyncProgress::DiscoveryComplete { total } => {
                if let Some(ref pb) = state.discover_bar {
                    pb.finish_with_message(format!("{} movies discovered", total));
                }
            }

            SyncProgress::Deduplicated {
                existing,
                new_candidates,
            } => {
                let pb = self.multi.add(ProgressBar::new(new_candidates as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:10}", "details"));
                if new_candidates == 0 {
                    pb.finish_with_message(format!("Up to date ({} stored)", existing));
                } else {
                    pb.set_message(format!("{} already stored", existing));
                }
                state.details_bar = Some(pb);
            }

            SyncProgress::FetchingChunk { chunk, chunks, .. } => {
                if let Some(ref pb) = state.details_bar {
                    pb.set_message(format!("chunk {}/{}", chunk, chunks));
                }
            }

            SyncProgress::FetchedDetails { name, .. } => {
                if let Some(ref pb) = state.details_bar {
                    pb.inc(1);
                    pb.set_message(name);
                }
            }

            SyncProgress::PersistingBatch { .. } => {
                if state.save_bar.is_none() {
                    let pb = self.multi.add(ProgressBar::new_spinner());
                    pb.set_style(Self::counter_style());
                    pb.set_prefix(format!("{:10}", "save"));
                    pb.set_message("inserted");
                    state.save_bar = Some(pb);
                }
            }

            SyncProgress::Persisted {
                inserted,
                skipped,
                failed,
            } => {
                state.skipped += skipped;
                state.failed += failed;
                let message = match (state.skipped, state.failed) {
                    (0, 0) => "inserted".to_string(),
                    (s, 0) => format!("inserted, {} skipped", s),
                    (s, f) => format!("inserted, {} skipped, {} failed", s, f),
                };
                if let Some(ref pb) = state.save_bar {
                    pb.inc(inserted);
                    pb.set_message(message);
                }
            }

            SyncProgress::Throttled {
                context,
                retry_after_ms,
                attempt,
            } => {
                self.multi
                    .println(format!(
                        "Rate limited on {} (attempt {}), retrying in {}ms",
                        context, attempt, retry_after_ms
                    ))
                    .ok();
            }

            SyncProgress::Warning { message } => {
                self.multi.println(format!("Warning: {}", message)).ok();
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.discover_bar, &state.details_bar, &state.save_bar]
            .into_iter()
            .flatten()
        {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>4} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_reporter() -> InteractiveReporter {
        let reporter = InteractiveReporter::new();
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    #[test]
    fn test_bars_follow_sync_phases() {
        let reporter = hidden_reporter();

        reporter.handle(SyncProgress::Discovering);
        reporter.handle(SyncProgress::FetchedPage {
            page: 1,
            count: 20,
            total_so_far: 20,
            total_pages: 3,
        });
        reporter.handle(SyncProgress::DiscoveryComplete { total: 60 });
        reporter.handle(SyncProgress::Deduplicated {
            existing: 58,
            new_candidates: 2,
        });
        reporter.handle(SyncProgress::FetchedDetails {
            id: 238,
            name: "The Godfather".to_string(),
        });
        reporter.handle(SyncProgress::PersistingBatch { count: 1 });
        reporter.handle(SyncProgress::Persisted {
            inserted: 1,
            skipped: 0,
            failed: 0,
        });

        let state = reporter.state.lock().unwrap();
        let discover = state.discover_bar.as_ref().expect("discover bar");
        assert!(discover.is_finished());
        assert_eq!(discover.length(), Some(3));

        let details = state.details_bar.as_ref().expect("details bar");
        assert_eq!(details.length(), Some(2));
        assert_eq!(details.position(), 1);

        assert_eq!(state.save_bar.as_ref().expect("save bar").position(), 1);
    }

    #[test]
    fn test_nothing_new_finishes_details_bar() {
        let reporter = hidden_reporter();
        reporter.handle(SyncProgress::Deduplicated {
            existing: 10,
            new_candidates: 0,
        });
        reporter.finish();

        let state = reporter.state.lock().unwrap();
        assert!(state.details_bar.as_ref().expect("details bar").is_finished());
        assert!(state.save_bar.is_none());
    }
}
