//! Progress events emitted while a sync runs.
//!
//! The library never prints; callers pass an optional [`ProgressCallback`]
//! and render events however they like (log lines, progress bars).

/// Progress events emitted during a sync.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting the discovery walk.
    Discovering,

    /// Fetched one page of discovery results.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Records on this page.
        count: usize,
        /// Running total of discovered records.
        total_so_far: usize,
        /// Total pages the server reported on this page.
        total_pages: u32,
    },

    /// Discovery finished.
    DiscoveryComplete {
        /// Records discovered, duplicates included.
        total: usize,
    },

    /// Candidates were checked against the store.
    Deduplicated {
        /// Candidates already stored.
        existing: usize,
        /// Candidates that still need details.
        new_candidates: usize,
    },

    /// Starting a chunk of concurrent detail fetches.
    FetchingChunk {
        /// Chunk number (1-indexed).
        chunk: usize,
        /// Total number of chunks.
        chunks: usize,
        /// Members in this chunk.
        size: usize,
    },

    /// Details arrived for one record.
    FetchedDetails {
        /// External id.
        id: i64,
        /// Display name.
        name: String,
    },

    /// Writing a chunk's records.
    PersistingBatch {
        /// Records in the batch.
        count: usize,
    },

    /// A chunk's records were written.
    Persisted {
        /// Rows inserted.
        inserted: u64,
        /// Rows skipped because the id was already stored.
        skipped: u64,
        /// Rows that failed to insert.
        failed: u64,
    },

    /// The remote side throttled a request; backing off before retrying.
    Throttled {
        /// What was being requested, e.g. `discover page 3` or `movie 238`.
        context: String,
        /// Time to wait before the retry (ms).
        retry_after_ms: u64,
        /// Retry number (1-indexed).
        attempt: u32,
    },

    /// Non-fatal warning.
    Warning {
        /// Warning message.
        message: String,
    },
}

/// Callback for progress updates during a sync.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
