//! Catalog sync engine.
//!
//! Works with any [`CatalogSource`]; wrap the source in a
//! [`RateLimitedClient`](crate::RateLimitedClient) to pace remote calls.
//!
//! # Example
//!
//! ```ignore
//! use reelsync::sync::{SyncOptions, synchronize};
//! use reelsync::{RateLimitedClient, rate_limit::TMDB_DEFAULT_RPS};
//!
//! let client = RateLimitedClient::new(tmdb_client, TMDB_DEFAULT_RPS);
//! let result = synchronize(&client, &db, &SyncOptions::default(), Some(&progress)).await?;
//! ```

mod details;

use std::collections::HashSet;

use sea_orm::DatabaseConnection;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{SyncError, SyncOptions, SyncResult};
use crate::repository::{find_existing_ids, insert_many_unordered};
use crate::tmdb::{CatalogSource, MovieSummary, to_active_model};

/// Distinct ids in first-seen order.
pub fn distinct_ids(candidates: &[MovieSummary]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .map(|c| c.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Run one sync: discover, skip stored ids, fetch details for the rest in
/// concurrent chunks and insert each chunk.
///
/// Chunks run one after another; within a chunk every detail fetch runs as
/// its own task. The first upstream or lookup failure ends the run, leaving
/// earlier chunks stored.
///
/// # Errors
/// Returns `SyncError::Upstream` if discovery or a detail fetch fails and
/// `SyncError::Persistence` if the stored-id lookup fails.
pub async fn synchronize<C: CatalogSource + Clone + 'static>(
    client: &C,
    db: &DatabaseConnection,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncResult, SyncError> {
    let mut result = SyncResult::default();

    emit(on_progress, SyncProgress::Discovering);
    let candidates = client.discover(on_progress).await?;
    result.discovered = candidates.len();
    emit(
        on_progress,
        SyncProgress::DiscoveryComplete {
            total: candidates.len(),
        },
    );

    let ids = distinct_ids(&candidates);
    let existing = find_existing_ids(db, &ids).await?;
    let new_ids: Vec<i64> = ids
        .into_iter()
        .filter(|id| !existing.contains(id))
        .collect();

    result.existing = existing.len();
    result.new_candidates = new_ids.len();
    emit(
        on_progress,
        SyncProgress::Deduplicated {
            existing: result.existing,
            new_candidates: result.new_candidates,
        },
    );
    tracing::info!(
        discovered = result.discovered,
        existing = result.existing,
        new_candidates = result.new_candidates,
        "Discovery deduplicated"
    );

    if options.dry_run || new_ids.is_empty() {
        return Ok(result);
    }

    let chunk_size = options.chunk_size.max(1);
    let chunks = new_ids.len().div_ceil(chunk_size);

    for (index, chunk) in new_ids.chunks(chunk_size).enumerate() {
        emit(
            on_progress,
            SyncProgress::FetchingChunk {
                chunk: index + 1,
                chunks,
                size: chunk.len(),
            },
        );

        let fetched = details::fetch_chunk(client, chunk, on_progress).await?;
        result.fetched += fetched.len();

        let models = fetched
            .iter()
            .map(|movie| {
                emit(
                    on_progress,
                    SyncProgress::FetchedDetails {
                        id: movie.id,
                        name: movie.title.clone(),
                    },
                );
                to_active_model(movie)
            })
            .collect::<Vec<_>>();

        emit(
            on_progress,
            SyncProgress::PersistingBatch {
                count: models.len(),
            },
        );
        let outcome = insert_many_unordered(db, models).await?;
        emit(
            on_progress,
            SyncProgress::Persisted {
                inserted: outcome.inserted,
                skipped: outcome.skipped,
                failed: outcome.failed,
            },
        );
        if outcome.failed > 0 {
            emit(
                on_progress,
                SyncProgress::Warning {
                    message: format!(
                        "{} of {} movies in chunk {} failed to insert",
                        outcome.failed,
                        outcome.total(),
                        index + 1
                    ),
                },
            );
        }
        tracing::debug!(
            chunk = index + 1,
            chunks,
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Chunk persisted"
        );

        result.record(outcome);
        result.chunks += 1;
    }

    tracing::info!(
        fetched = result.fetched,
        inserted = result.inserted,
        skipped = result.skipped,
        failed = result.failed,
        "Sync complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {id}"),
        }
    }

    #[test]
    fn test_distinct_ids_keeps_first_occurrence_order() {
        let candidates = vec![summary(5), summary(3), summary(5), summary(9), summary(3)];
        assert_eq!(distinct_ids(&candidates), vec![5, 3, 9]);
    }

    #[test]
    fn test_distinct_ids_empty() {
        assert!(distinct_ids(&[]).is_empty());
    }
}
