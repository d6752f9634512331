use tokio::sync::mpsc;

use crate::tmdb::{CatalogSource, MovieDetails};

use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::SyncError;

/// Fetch details for every id in `ids` concurrently.
///
/// One task per id; results come back in `ids` order. The first failure
/// aborts the tasks still running and is returned.
///
/// Tasks can't borrow `on_progress`, so their events (throttle retries) go
/// through a channel and are re-emitted here while the chunk is awaited.
pub(super) async fn fetch_chunk<C: CatalogSource + Clone + 'static>(
    client: &C,
    ids: &[i64],
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<MovieDetails>, SyncError> {
    let (events_tx, mut events) = mpsc::unbounded_channel::<SyncProgress>();
    let mut handles = Vec::with_capacity(ids.len());

    for &id in ids {
        let client = client.clone();
        let events_tx = events_tx.clone();
        handles.push(tokio::spawn(async move {
            let forward: ProgressCallback = Box::new(move |event| {
                let _ = events_tx.send(event);
            });
            client.movie_details(id, Some(&forward)).await
        }));
    }
    drop(events_tx);

    let mut details = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(mut handle) = pending.next() {
        let joined = loop {
            tokio::select! {
                joined = &mut handle => break joined,
                Some(event) = events.recv() => emit(on_progress, event),
            }
        };

        let failure = match joined {
            Ok(Ok(movie)) => {
                details.push(movie);
                continue;
            }
            Ok(Err(e)) => SyncError::Upstream(e),
            Err(e) => SyncError::Task(e.to_string()),
        };

        let mut aborted = 0usize;
        for rest in pending.by_ref() {
            rest.abort();
            aborted += 1;
        }
        tracing::warn!(error = %failure, aborted, "Detail fetch failed, aborting chunk");
        return Err(failure);
    }

    while let Ok(event) = events.try_recv() {
        emit(on_progress, event);
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::tmdb::{MovieSummary, TmdbError};

    #[derive(Clone, Default)]
    struct SlowSource {
        failing_id: Option<i64>,
        throttled_id: Option<i64>,
        completed: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        peak_in_flight: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CatalogSource for SlowSource {
        async fn discover(
            &self,
            _on_progress: Option<&ProgressCallback>,
        ) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(Vec::new())
        }

        async fn movie_details(
            &self,
            id: i64,
            on_progress: Option<&ProgressCallback>,
        ) -> Result<MovieDetails, TmdbError> {
            if Some(id) == self.failing_id {
                return Err(TmdbError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            if Some(id) == self.throttled_id {
                emit(
                    on_progress,
                    SyncProgress::Throttled {
                        context: format!("movie {id}"),
                        retry_after_ms: 3000,
                        attempt: 1,
                    },
                );
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            // Later ids finish first.
            tokio::time::sleep(Duration::from_millis(1000 - id as u64 * 10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.completed.fetch_add(1, Ordering::SeqCst);

            Ok(MovieDetails {
                id,
                title: format!("Movie {id}"),
                overview: None,
                popularity: 1.0,
                vote_average: 8.5,
                vote_count: 1500,
                release_date: "2000-01-01".to_string(),
                genres: Vec::new(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_chunk_keeps_input_order() {
        let source = SlowSource::default();
        let details = fetch_chunk(&source, &[1, 2, 3, 4], None)
            .await
            .expect("fetch");
        let ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_chunk_runs_every_fetch_at_once() {
        let source = SlowSource::default();
        let started = tokio::time::Instant::now();

        fetch_chunk(&source, &[1, 2, 3, 4], None)
            .await
            .expect("fetch");

        // Slowest fetch is 990ms; one after another would take 3900ms.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(990), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");
        assert_eq!(source.peak_in_flight.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_chunk_forwards_task_progress() {
        let source = SlowSource {
            throttled_id: Some(3),
            ..Default::default()
        };
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            sink.lock().unwrap().push(event);
        });

        fetch_chunk(&source, &[1, 2, 3], Some(&callback))
            .await
            .expect("fetch");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            SyncProgress::Throttled { context, attempt: 1, .. } if context == "movie 3"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_chunk_aborts_siblings_on_failure() {
        let source = SlowSource {
            failing_id: Some(1),
            ..Default::default()
        };
        let completed = Arc::clone(&source.completed);

        let err = fetch_chunk(&source, &[1, 2, 3], None)
            .await
            .expect_err("first id fails");
        assert!(matches!(err, SyncError::Upstream(TmdbError::Api { status: 500, .. })));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_chunk_empty_input() {
        let details = fetch_chunk(&SlowSource::default(), &[], None)
            .await
            .expect("fetch");
        assert!(details.is_empty());
    }
}
