use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};

use crate::entity::movie::{ActiveModel, Entity as Movie, Genre, Model};

use super::errors::{RepositoryError, Result};

/// Input for [`save`]: a movie as a caller hands it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub release_date: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl NewMovie {
    /// Check field ranges.
    ///
    /// # Errors
    /// Returns `RepositoryError::InvalidInput` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::invalid("name must not be empty"));
        }
        if self.popularity.is_nan() || self.popularity < 0.0 {
            return Err(RepositoryError::invalid("popularity must be >= 0"));
        }
        if !(0.0..=10.0).contains(&self.vote_average) {
            return Err(RepositoryError::invalid("voteAverage must be within 0..=10"));
        }
        if self.vote_count < 0 {
            return Err(RepositoryError::invalid("voteCount must be >= 0"));
        }
        if self.release_date.trim().is_empty() {
            return Err(RepositoryError::invalid("releaseDate must not be empty"));
        }
        if self.genres.iter().any(|g| g.name.trim().is_empty()) {
            return Err(RepositoryError::invalid("genre names must not be empty"));
        }
        Ok(())
    }

    fn into_active_model(self) -> ActiveModel {
        let now = Utc::now().fixed_offset();
        ActiveModel {
            id: Set(self.id),
            name: Set(self.name),
            overview: Set(self.overview),
            popularity: Set(self.popularity),
            vote_average: Set(self.vote_average),
            vote_count: Set(self.vote_count),
            release_date: Set(self.release_date),
            genres: Set(serde_json::to_value(&self.genres).unwrap_or_else(|_| serde_json::json!([]))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

// ─── Single Record Operations ────────────────────────────────────────────────

/// Validate and insert one movie.
///
/// # Errors
/// Returns `RepositoryError::Conflict` if the id is already stored and
/// `RepositoryError::InvalidInput` if validation fails.
pub async fn save(db: &DatabaseConnection, movie: NewMovie) -> Result<Model> {
    movie.validate()?;
    let id = movie.id;

    if Movie::find_by_id(id).one(db).await?.is_some() {
        return Err(RepositoryError::Conflict { id });
    }

    movie
        .into_active_model()
        .with_search_keys()
        .insert(db)
        .await
        .map_err(|e| conflict_or_database(e, id))
}

/// Find a movie by id.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if no movie has this id.
pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Model> {
    Movie::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RepositoryError::not_found_by_id(id))
}

/// Delete a movie by id and return what was deleted.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if no movie has this id.
pub async fn remove_by_id(db: &DatabaseConnection, id: i64) -> Result<Model> {
    let existing = find_by_id(db, id).await?;
    let result = Movie::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(RepositoryError::not_found_by_id(id));
    }
    Ok(existing)
}

/// A unique violation on insert means someone else stored the id first.
fn conflict_or_database(err: DbErr, id: i64) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Conflict { id },
        _ => RepositoryError::Database(err),
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn movie() -> NewMovie {
        NewMovie {
            id: 238,
            name: "The Godfather".to_string(),
            overview: None,
            popularity: 120.5,
            vote_average: 8.7,
            vote_count: 21000,
            release_date: "1972-03-14".to_string(),
            genres: vec![Genre {
                id: 18,
                name: "Drama".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_movie_passes() {
        movie().validate().expect("movie should be valid");
    }

    #[test]
    fn test_validation_rejects_out_of_range_fields() {
        let cases: Vec<(NewMovie, &str)> = vec![
            (NewMovie { name: " ".to_string(), ..movie() }, "name"),
            (NewMovie { popularity: -0.1, ..movie() }, "popularity"),
            (NewMovie { popularity: f64::NAN, ..movie() }, "popularity"),
            (NewMovie { vote_average: 10.5, ..movie() }, "voteAverage"),
            (NewMovie { vote_count: -1, ..movie() }, "voteCount"),
            (NewMovie { release_date: String::new(), ..movie() }, "releaseDate"),
        ];

        for (input, field) in cases {
            let err = input.validate().expect_err("should be rejected");
            assert!(err.to_string().contains(field), "{err} should name {field}");
        }
    }

    #[test]
    fn test_new_movie_deserializes_camel_case() {
        let movie: NewMovie = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Up",
            "popularity": 3.5,
            "voteAverage": 8.0,
            "voteCount": 9000,
            "releaseDate": "2009-05-28"
        }))
        .expect("camelCase payload should parse");

        assert_eq!(movie.vote_count, 9000);
        assert!(movie.genres.is_empty());
        assert!(movie.overview.is_none());
    }
}
