//! Movie entity - the persisted catalog record.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// A genre attached to a movie, stored inside the `genres` JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Movie model, keyed by the external TMDB identifier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    /// External TMDB id. Never generated locally.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub overview: Option<String>,

    // ─── Ratings ─────────────────────────────────────────────────────────────
    #[sea_orm(column_type = "Double")]
    pub popularity: f64,
    #[sea_orm(column_type = "Double")]
    pub vote_average: f64,
    pub vote_count: i64,

    /// ISO-like `YYYY-MM-DD`; compared lexicographically by range filters.
    pub release_date: String,

    /// JSON array of `{ "id": .., "name": .. }` objects, passed through from TMDB.
    #[sea_orm(column_type = "Json")]
    pub genres: serde_json::Value,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,

    // ─── Search keys ─────────────────────────────────────────────────────────
    /// `name` folded by [`search_key`]; substring filters match against this.
    #[serde(skip)]
    pub name_search: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip)]
    pub overview_search: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Case-folded form of `text` used for substring search.
///
/// Folding happens here rather than in SQL: SQLite's `LOWER()` only folds
/// ASCII, so `ÉLAN` would never match `élan`.
pub fn search_key(text: &str) -> String {
    text.to_lowercase()
}

impl ActiveModel {
    /// Fill the search columns from whatever `name` and `overview` are set to.
    pub fn with_search_keys(mut self) -> Self {
        if let ActiveValue::Set(name) = &self.name {
            self.name_search = Set(search_key(name));
        }
        if let ActiveValue::Set(overview) = &self.overview {
            self.overview_search = Set(overview.as_deref().map(search_key));
        }
        self
    }
}

impl Model {
    /// Decode the stored genres. Malformed entries yield an empty list.
    pub fn genre_list(&self) -> Vec<Genre> {
        serde_json::from_value(self.genres.clone()).unwrap_or_default()
    }
}

impl Column {
    /// Resolve a field name from the query surface (`voteAverage`,
    /// `releaseDate`, ...) to its column.
    ///
    /// Snake-case column names are accepted too.
    pub fn from_query_field(field: &str) -> Option<Self> {
        match field {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "overview" => Some(Self::Overview),
            "popularity" => Some(Self::Popularity),
            "voteAverage" | "vote_average" => Some(Self::VoteAverage),
            "voteCount" | "vote_count" => Some(Self::VoteCount),
            "releaseDate" | "release_date" => Some(Self::ReleaseDate),
            _ => None,
        }
    }

    /// Folded shadow column that substring filters on this column match against.
    pub fn search_column(&self) -> Option<Self> {
        match self {
            Self::Name => Some(Self::NameSearch),
            Self::Overview => Some(Self::OverviewSearch),
            _ => None,
        }
    }

    /// Columns whose values are numbers; text filter values are coerced for these.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Id | Self::Popularity | Self::VoteAverage | Self::VoteCount
        )
    }

    /// Columns holding integers rather than floating point numbers.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Id | Self::VoteCount)
    }
}
