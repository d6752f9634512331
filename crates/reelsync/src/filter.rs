//! Flat query -> structured filter translation.
//!
//! A [`FlatQuery`] is the loosely typed key/value bag a caller hands in
//! (`name=god`, `voteAverage.gte=8`, `page=2`, ...). [`build_filter`]
//! classifies each key by the per-query [`QueryOptions`] into exact matches,
//! case-insensitive substring matches, and inclusive ranges (keys ending in
//! `.gte` / `.lte`). The resulting [`Filter`] is storage-agnostic; the
//! repository layer turns it into SQL.
//!
//! # Example
//!
//! ```
//! use reelsync::filter::{FlatQuery, QueryOptions, build_filter};
//!
//! let query = FlatQuery::new()
//!     .with("name", "god")
//!     .with("voteAverage.gte", 8.5)
//!     .with("page", 2);
//! let options = QueryOptions::new().non_exact(["name"]);
//!
//! let filter = build_filter(&query, &options);
//! assert_eq!(filter.len(), 2);
//! ```

mod builder;
mod types;

pub use builder::build_filter;
pub use types::{Filter, FilterCondition, FlatQuery, QueryOptions, QueryValue};
