//! TMDB API data types and client configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::entity::movie::Genre;
use crate::retry::RetryPolicy;

/// Public TMDB v3 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Discovery endpoint path.
pub const DISCOVER_MOVIES: &str = "/discover/movie";

/// Per-request timeout for the reqwest transport.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One entry of a discovery page. Only `id` is needed downstream.
///
/// API docs: https://developer.themoviedb.org/reference/discover-movie
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Full movie record from `/movie/{id}`.
///
/// Numeric fields default to zero and text fields to empty when TMDB omits
/// them or sends `null`, which it does for sparse entries.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Ordered query parameters sent with every discovery page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverParams {
    params: Vec<(String, String)>,
}

impl DiscoverParams {
    /// No filters at all.
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Set a parameter. An existing key keeps its position.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for DiscoverParams {
    /// Highly rated, widely voted movies available on provider 8 in Turkey,
    /// oldest first.
    fn default() -> Self {
        Self::empty()
            .with("sort_by", "release_date.asc")
            .with("vote_count.gte", 1500)
            .with("vote_average.gte", 8.4)
            .with("with_watch_providers", 8)
            .with("watch_region", "TR")
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for DiscoverParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |params, (k, v)| params.with(k, v))
    }
}

/// TMDB client configuration.
#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub retry: RetryPolicy,
    /// Abort discovery past this many pages. `None` trusts `total_pages`.
    pub max_pages: Option<u32>,
    pub discover: DiscoverParams,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            max_pages: None,
            discover: DiscoverParams::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn with_discover(mut self, discover: DiscoverParams) -> Self {
        self.discover = discover;
        self
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("max_pages", &self.max_pages)
            .field("discover", &self.discover)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_discover_params_order() {
        let params = DiscoverParams::default();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "sort_by",
                "vote_count.gte",
                "vote_average.gte",
                "with_watch_providers",
                "watch_region"
            ]
        );
    }

    #[test]
    fn test_discover_params_with_replaces_in_place() {
        let params = DiscoverParams::default().with("sort_by", "popularity.desc");
        let first = params.iter().next().expect("first param");
        assert_eq!(first, ("sort_by", "popularity.desc"));
    }

    #[test]
    fn test_movie_details_tolerates_sparse_payload() {
        let details: MovieDetails = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Sparse",
            "overview": null,
            "release_date": null
        }))
        .expect("sparse details should parse");

        assert_eq!(details.id, 42);
        assert_eq!(details.release_date, "");
        assert_eq!(details.vote_count, 0);
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = TmdbConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
