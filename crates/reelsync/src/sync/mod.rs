//! Catalog synchronization.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncOptions`, `SyncResult`, `SyncError`, constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The sync run itself: `synchronize()`

pub mod engine;
mod progress;
mod types;

pub use types::{DEFAULT_CHUNK_SIZE, SyncError, SyncOptions, SyncResult};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use engine::{distinct_ids, synchronize};
