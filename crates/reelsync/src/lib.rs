//! reelsync - keeps a local movie catalog in step with TMDB.
//!
//! The crate has two halves:
//!
//! - a synchronization pipeline that walks the paginated, rate-limited TMDB
//!   discover endpoint, skips movies already stored, fetches details for the
//!   rest in concurrent chunks and bulk-inserts them ([`sync`]);
//! - a query path that turns a flat set of filter parameters into a
//!   structured storage filter with pagination ([`filter`], [`pagination`],
//!   [`repository`]).
//!
//! # Features
//!
//! - `sqlite` / `postgres` - database backends for sea-orm.
//! - `migrate` - enables [`connect_and_migrate`] and the bundled migrations.
//! - `tmdb` - enables the reqwest-backed HTTP transport used by
//!   [`tmdb::TmdbClient::new`].
//!
//! # Example
//!
//! ```ignore
//! use reelsync::{connect_and_migrate, sync, tmdb::{TmdbClient, TmdbConfig}};
//!
//! let db = connect_and_migrate("sqlite://reelsync.db?mode=rwc").await?;
//! let client = TmdbClient::new(TmdbConfig::new(api_key))?;
//! let result = sync::synchronize(&client, &db, &sync::SyncOptions::default(), None).await?;
//! println!("inserted {} movies", result.inserted);
//! ```

pub mod db;
pub mod entity;
pub mod filter;
pub mod http;
pub mod pagination;
pub mod rate_limit;
pub mod repository;
pub mod retry;
pub mod sync;
pub mod tmdb;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use filter::{Filter, FilterCondition, FlatQuery, QueryOptions, QueryValue, build_filter};
pub use pagination::{Page, paginate};
pub use rate_limit::{ApiRateLimiter, RateLimitedClient};
pub use repository::RepositoryError;
