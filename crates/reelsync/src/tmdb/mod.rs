//! TMDB API client for movie discovery and details.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for TMDB API operations
//! - [`types`] - Payloads and client configuration
//! - [`client`] - The HTTP client: paginated discovery and detail lookups
//! - [`convert`] - Conversion to movie entities
//!
//! The sync engine talks to TMDB only through [`CatalogSource`], so it can be
//! driven by fakes in tests or wrapped in a [`RateLimitedClient`](crate::RateLimitedClient).
//!
//! ```ignore
//! use reelsync::tmdb::{CatalogSource, TmdbClient, TmdbConfig};
//!
//! let client = TmdbClient::new(TmdbConfig::new(api_key))?;
//! let summaries = client.discover(None).await?;
//! println!("{} movies match the discovery filters", summaries.len());
//! ```

mod client;
mod convert;
mod error;
mod source;
mod types;

pub use client::TmdbClient;
pub use convert::to_active_model;
pub use error::{THROTTLE_STATUS, TmdbError, short_error_message};
pub use source::CatalogSource;
pub use types::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DISCOVER_MOVIES, DiscoverPage, DiscoverParams,
    MovieDetails, MovieSummary, TmdbConfig,
};
