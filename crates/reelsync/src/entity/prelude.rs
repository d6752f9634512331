//! Common re-exports for convenient entity usage.

pub use super::movie::{
    ActiveModel as MovieActiveModel, Column as MovieColumn, Entity as Movie, Genre,
    Model as MovieModel,
};
