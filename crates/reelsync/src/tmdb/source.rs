use async_trait::async_trait;

use super::error::TmdbError;
use super::types::{MovieDetails, MovieSummary};
use crate::sync::ProgressCallback;

/// Remote side of a sync: something that can list candidates and describe
/// one of them in full.
///
/// [`TmdbClient`](super::TmdbClient) is the production implementation; tests
/// use in-memory fakes.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Walk every discovery page and return all summaries in page order.
    async fn discover(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<MovieSummary>, TmdbError>;

    /// Fetch full details for one movie.
    async fn movie_details(
        &self,
        id: i64,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MovieDetails, TmdbError>;
}
