//! Model conversion from TMDB payloads to movie entities.

use chrono::Utc;
use sea_orm::Set;

use super::types::MovieDetails;
use crate::entity::movie::ActiveModel as MovieActiveModel;

/// Convert TMDB movie details to an insertable movie record.
///
/// `title` becomes `name`; genres are stored as returned. Both timestamps
/// are set to now.
pub fn to_active_model(details: &MovieDetails) -> MovieActiveModel {
    let now = Utc::now().fixed_offset();

    MovieActiveModel {
        id: Set(details.id),
        name: Set(details.title.clone()),
        overview: Set(details.overview.clone()),
        popularity: Set(details.popularity),
        vote_average: Set(details.vote_average),
        vote_count: Set(details.vote_count),
        release_date: Set(details.release_date.clone()),
        genres: Set(serde_json::to_value(&details.genres).unwrap_or_else(|_| serde_json::json!([]))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}
