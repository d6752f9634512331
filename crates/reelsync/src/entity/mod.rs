//! SeaORM entity definitions for the reelsync database schema.

pub mod movie;
pub mod prelude;
