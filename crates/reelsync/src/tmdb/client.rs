//! TMDB API client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use super::error::TmdbError;
use super::source::CatalogSource;
use super::types::{DISCOVER_MOVIES, DiscoverPage, DiscoverParams, MovieDetails, MovieSummary, TmdbConfig};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::retry::retry_on_throttle;
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// TMDB v3 client.
///
/// Every request carries the API key as the first query parameter and is
/// retried through [`retry_on_throttle`] while TMDB answers 429.
#[derive(Clone)]
pub struct TmdbClient {
    transport: Arc<dyn HttpTransport>,
    config: Arc<TmdbConfig>,
}

impl TmdbClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    /// Returns `TmdbError::Config` if the API key is empty or the HTTP client
    /// cannot be built.
    #[cfg(feature = "tmdb")]
    pub fn new(config: TmdbConfig) -> Result<Self, TmdbError> {
        use crate::http::reqwest_transport::ReqwestTransport;

        if config.api_key.trim().is_empty() {
            return Err(TmdbError::Config("TMDB API key is empty".to_string()));
        }
        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| TmdbError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(config, Arc::new(transport)))
    }

    pub fn new_with_transport(mut config: TmdbConfig, transport: Arc<dyn HttpTransport>) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    /// Build `{base_url}{path}?api_key=..&k=v..`, parameters in the given order.
    fn url<'a>(&self, path: &str, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("api_key", &self.config.api_key);
        for (k, v) in params {
            query.append_pair(k, v);
        }
        format!("{}{}?{}", self.config.base_url, path, query.finish())
    }

    /// One GET, no retry.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, TmdbError> {
        let response: HttpResponse = self
            .transport
            .send(HttpRequest::get(url))
            .await
            .map_err(|e| TmdbError::Http(e.to_string()))?;

        if !response.is_success() {
            return Err(TmdbError::Api {
                status: response.status,
                message: response.body_text(),
            });
        }

        response.parse().map_err(TmdbError::Json)
    }

    /// Walk a paginated listing from page 1 until the server's `total_pages`.
    ///
    /// Each page is `params` plus `page=N`. Throttled pages are retried per
    /// the configured policy; any other failure aborts the walk.
    ///
    /// # Errors
    /// Returns `TmdbError::PageLimitExceeded` if `max_pages` is configured and
    /// the listing runs past it.
    pub async fn fetch_all(
        &self,
        endpoint: &str,
        params: &DiscoverParams,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<MovieSummary>, TmdbError> {
        let mut results = Vec::new();
        let mut page: u32 = 1;

        loop {
            if let Some(max_pages) = self.config.max_pages
                && page > max_pages
            {
                tracing::warn!(endpoint, max_pages, "Pagination guard tripped");
                return Err(TmdbError::PageLimitExceeded { max_pages });
            }

            let page_str = page.to_string();
            let url = self.url(endpoint, params.iter().chain([("page", page_str.as_str())]));
            let context = format!("{endpoint} page {page}");

            let body: DiscoverPage = retry_on_throttle(
                || self.get(&url),
                TmdbError::is_throttled,
                &self.config.retry,
                &context,
                on_progress,
            )
            .await?;

            let count = body.results.len();
            let total_pages = body.total_pages;
            results.extend(body.results);

            tracing::debug!(endpoint, page, total_pages, count, "Fetched page");
            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    page,
                    count,
                    total_so_far: results.len(),
                    total_pages,
                },
            );

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(results)
    }

    /// Fetch `/movie/{id}`.
    pub async fn movie_details(
        &self,
        id: i64,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MovieDetails, TmdbError> {
        let url = self.url(&format!("/movie/{id}"), std::iter::empty());
        let context = format!("movie {id}");

        retry_on_throttle(
            || self.get(&url),
            TmdbError::is_throttled,
            &self.config.retry,
            &context,
            on_progress,
        )
        .await
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn discover(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<MovieSummary>, TmdbError> {
        tracing::info!("Fetching movies from TMDB discover endpoint");
        self.fetch_all(DISCOVER_MOVIES, &self.config.discover, on_progress)
            .await
    }

    async fn movie_details(
        &self,
        id: i64,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MovieDetails, TmdbError> {
        TmdbClient::movie_details(self, id, on_progress).await
    }
}
