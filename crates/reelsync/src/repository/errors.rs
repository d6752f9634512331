use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Movie not found.
    #[error("Movie not found: {context}")]
    NotFound { context: String },

    /// A movie with this id is already stored.
    #[error("Movie already exists: id={id}")]
    Conflict { id: i64 },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepositoryError {
    /// Create a NotFound error for an id lookup.
    pub fn not_found_by_id(id: i64) -> Self {
        Self::NotFound {
            context: format!("id={}", id),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
