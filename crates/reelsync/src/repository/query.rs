use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::{Deserialize, Serialize};

use crate::entity::movie::{Column, Entity as Movie, Model};
use crate::filter::{Filter, FlatQuery, QueryOptions, build_filter};
use crate::pagination::{Page, paginate};

use super::errors::Result;
use super::filter::filter_condition;

/// Maximum ids per `IN (...)` list.
const ID_LOOKUP_BATCH: usize = 500;

/// Typed movie query, as the list endpoint accepts it.
///
/// Serialized names match the flat query keys (`voteAverage.gte`, ...), so
/// a query string or JSON body deserializes straight into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieQuery {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub overview: Option<String>,

    #[serde(rename = "popularity.gte")]
    pub popularity_gte: Option<f64>,
    #[serde(rename = "popularity.lte")]
    pub popularity_lte: Option<f64>,
    #[serde(rename = "voteAverage.gte")]
    pub vote_average_gte: Option<f64>,
    #[serde(rename = "voteAverage.lte")]
    pub vote_average_lte: Option<f64>,
    #[serde(rename = "voteCount.gte")]
    pub vote_count_gte: Option<i64>,
    #[serde(rename = "voteCount.lte")]
    pub vote_count_lte: Option<i64>,
    #[serde(rename = "releaseDate.gte")]
    pub release_date_gte: Option<String>,
    #[serde(rename = "releaseDate.lte")]
    pub release_date_lte: Option<String>,

    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl MovieQuery {
    /// Field roles for movie queries: `id` exact, `name` and `overview` by substring.
    pub fn options() -> QueryOptions {
        QueryOptions::new()
            .exact(["id"])
            .non_exact(["name", "overview"])
    }

    /// Flatten into query keys. Unset fields stay undefined.
    pub fn to_flat_query(&self) -> FlatQuery {
        let mut query = FlatQuery::new();
        query.insert_opt("id", self.id);
        query.insert_opt("name", self.name.clone());
        query.insert_opt("overview", self.overview.clone());
        query.insert_opt("popularity.gte", self.popularity_gte);
        query.insert_opt("popularity.lte", self.popularity_lte);
        query.insert_opt("voteAverage.gte", self.vote_average_gte);
        query.insert_opt("voteAverage.lte", self.vote_average_lte);
        query.insert_opt("voteCount.gte", self.vote_count_gte);
        query.insert_opt("voteCount.lte", self.vote_count_lte);
        query.insert_opt("releaseDate.gte", self.release_date_gte.clone());
        query.insert_opt("releaseDate.lte", self.release_date_lte.clone());
        query.insert_opt("page", self.page);
        query.insert_opt("limit", self.limit);
        query
    }

    pub fn page(&self) -> Page {
        paginate(self.page, self.limit)
    }
}

/// One page of movies plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedMovies {
    pub data: Vec<Model>,
    pub total: u64,
}

// ─── Query Operations ────────────────────────────────────────────────────────

fn filtered(filter: &Filter) -> Result<Select<Movie>> {
    let select = Movie::find();
    if filter.is_empty() {
        return Ok(select);
    }
    Ok(select.filter(filter_condition(filter)?))
}

/// Movies matching `filter`, ordered by id, within `page`.
pub async fn find(db: &DatabaseConnection, filter: &Filter, page: Page) -> Result<Vec<Model>> {
    let models = filtered(filter)?
        .order_by_asc(Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok(models)
}

/// Number of movies matching `filter`.
pub async fn count(db: &DatabaseConnection, filter: &Filter) -> Result<u64> {
    Ok(filtered(filter)?.count(db).await?)
}

/// Run a flat query with the given field roles.
///
/// The page and its total are fetched concurrently.
pub async fn find_filtered(
    db: &DatabaseConnection,
    query: &FlatQuery,
    options: &QueryOptions,
    page: Page,
) -> Result<PaginatedMovies> {
    let filter = build_filter(query, options);
    let (data, total) = tokio::try_join!(find(db, &filter, page), count(db, &filter))?;
    Ok(PaginatedMovies { data, total })
}

/// Run a typed movie query.
pub async fn find_movies(db: &DatabaseConnection, query: &MovieQuery) -> Result<PaginatedMovies> {
    find_filtered(db, &query.to_flat_query(), &MovieQuery::options(), query.page()).await
}

/// Which of `ids` are already stored.
///
/// Looks ids up in batches so the `IN` list stays bounded.
pub async fn find_existing_ids(db: &DatabaseConnection, ids: &[i64]) -> Result<HashSet<i64>> {
    let mut existing = HashSet::new();

    for chunk in ids.chunks(ID_LOOKUP_BATCH) {
        let found: Vec<i64> = Movie::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Id.is_in(chunk.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;
        existing.extend(found);
    }

    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCondition, QueryValue};

    #[test]
    fn test_movie_query_flattens_only_set_fields() {
        let query = MovieQuery {
            name: Some("god".to_string()),
            vote_average_gte: Some(8.5),
            release_date_lte: Some("1999-12-31".to_string()),
            page: Some(2),
            ..Default::default()
        };

        let flat = query.to_flat_query();
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["name", "voteAverage.gte", "releaseDate.lte", "page"]
        );
    }

    #[test]
    fn test_movie_query_builds_expected_filter() {
        let query = MovieQuery {
            id: Some(238),
            overview: Some("mafia".to_string()),
            vote_count_gte: Some(1500),
            vote_count_lte: Some(30000),
            limit: Some(5),
            ..Default::default()
        };

        let filter = build_filter(&query.to_flat_query(), &MovieQuery::options());
        assert_eq!(
            filter.conditions,
            vec![
                FilterCondition::Eq {
                    field: "id".to_string(),
                    value: QueryValue::Int(238),
                },
                FilterCondition::Contains {
                    field: "overview".to_string(),
                    text: "mafia".to_string(),
                },
                FilterCondition::Range {
                    field: "voteCount".to_string(),
                    gte: Some(QueryValue::Int(1500)),
                    lte: Some(QueryValue::Int(30000)),
                },
            ]
        );
        assert_eq!(query.page(), Page { skip: 0, limit: 5 });
    }

    #[test]
    fn test_movie_query_deserializes_dotted_keys() {
        let query: MovieQuery = serde_json::from_value(serde_json::json!({
            "popularity.gte": 10.5,
            "releaseDate.gte": "1990-01-01",
            "page": 3
        }))
        .expect("dotted keys should parse");

        assert_eq!(query.popularity_gte, Some(10.5));
        assert_eq!(query.release_date_gte.as_deref(), Some("1990-01-01"));
        assert_eq!(query.page, Some(3));
    }
}
