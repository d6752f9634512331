//! Proactive request pacing with `governor`.
//!
//! Optional: TMDB's 429s are already handled by
//! [`retry_on_throttle`](crate::retry::retry_on_throttle).

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::sync::ProgressCallback;
use crate::tmdb::{CatalogSource, MovieDetails, MovieSummary, TmdbError};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default TMDB pacing. TMDB's own ceiling is around 50 requests per second.
pub const TMDB_DEFAULT_RPS: u32 = 20;

fn quota(requests_per_second: u32) -> Quota {
    Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN))
}

/// A standalone limiter for code paths that don't go through [`CatalogSource`].
///
/// ```ignore
/// let limiter = ApiRateLimiter::new(20);
/// limiter.wait().await;
/// client.movie_details(238, None).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Limit to `requests_per_second`; `0` is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            inner: Arc::new(RateLimiter::direct(quota(requests_per_second))),
        }
    }

    /// Wait until a request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// A rate-limited wrapper around any [`CatalogSource`].
///
/// Each detail lookup waits for a permit. Discovery waits once up front; the
/// page walk inside it is sequential and already paced by round-trips.
pub struct RateLimitedClient<C> {
    inner: C,
    limiter: ApiRateLimiter,
}

impl<C> RateLimitedClient<C> {
    pub fn new(inner: C, requests_per_second: u32) -> Self {
        Self {
            inner,
            limiter: ApiRateLimiter::new(requests_per_second),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> Clone for RateLimitedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

#[async_trait]
impl<C: CatalogSource> CatalogSource for RateLimitedClient<C> {
    async fn discover(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<MovieSummary>, TmdbError> {
        self.limiter.wait().await;
        self.inner.discover(on_progress).await
    }

    async fn movie_details(
        &self,
        id: i64,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<MovieDetails, TmdbError> {
        self.limiter.wait().await;
        self.inner.movie_details(id, on_progress).await
    }
}
