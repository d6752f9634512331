//! Sync progress output.
//!
//! On a terminal, sync phases render as indicatif bars; otherwise (CI, cron,
//! pipes) every event becomes a tracing line.

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use reelsync::sync::{ProgressCallback, SyncProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

pub enum ProgressReporter {
    Bars(InteractiveReporter),
    Log(LoggingReporter),
}

impl ProgressReporter {
    /// Bars when stdout is a terminal, log lines otherwise.
    pub fn new() -> Self {
        Self::for_terminal(Term::stdout().is_term())
    }

    fn for_terminal(is_term: bool) -> Self {
        if is_term {
            Self::Bars(InteractiveReporter::new())
        } else {
            Self::Log(LoggingReporter::new())
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Bars(bars) => bars.handle(event),
            Self::Log(log) => log.handle(event),
        }
    }

    /// Callback for [`reelsync::sync::synchronize`] that shares this reporter.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    /// Finish whatever bars are still drawing.
    pub fn finish(&self) {
        if let Self::Bars(bars) = self {
            bars.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
