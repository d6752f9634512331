//! Movie persistence: single-record CRUD, unordered bulk inserts and
//! filtered, paginated queries.

mod bulk;
mod errors;
mod filter;
mod query;
mod single;

pub use bulk::{BulkInsertOutcome, insert_many_unordered};
pub use errors::{RepositoryError, Result};
pub use filter::filter_condition;
pub use query::{
    MovieQuery, PaginatedMovies, count, find, find_existing_ids, find_filtered, find_movies,
};
pub use single::{NewMovie, find_by_id, remove_by_id, save};
