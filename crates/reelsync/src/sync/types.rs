//! Sync options, results and errors.

use serde::Serialize;
use thiserror::Error;

use crate::repository::{BulkInsertOutcome, RepositoryError};
use crate::tmdb::TmdbError;

/// Default number of detail fetches run concurrently per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 40;

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Detail fetches per chunk. Chunks run one after another.
    pub chunk_size: usize,
    /// Discover and dedupe only; never fetch details or write.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            dry_run: false,
        }
    }
}

/// Result of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Summaries returned by discovery, duplicates included.
    pub discovered: usize,
    /// Distinct candidates already stored.
    pub existing: usize,
    /// Distinct candidates not yet stored.
    pub new_candidates: usize,
    /// Detail records fetched.
    pub fetched: usize,
    /// Rows inserted.
    pub inserted: u64,
    /// Rows skipped on insert because the id appeared meanwhile.
    pub skipped: u64,
    /// Rows that failed to insert.
    pub failed: u64,
    /// Chunks processed.
    pub chunks: usize,
}

impl SyncResult {
    pub(crate) fn record(&mut self, outcome: BulkInsertOutcome) {
        self.inserted += outcome.inserted;
        self.skipped += outcome.skipped;
        self.failed += outcome.failed;
    }
}

/// Errors that abort a sync run.
///
/// Chunks persisted before the failure stay persisted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] TmdbError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    /// A detail fetch task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(String),
}
