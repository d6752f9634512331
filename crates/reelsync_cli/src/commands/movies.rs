//! Stored movie commands: filtered listing, lookup, manual add and delete.

use std::io::Read;

use clap::{Subcommand, ValueEnum};
use tabled::Tabled;

use reelsync::entity::movie::Model;
use reelsync::repository::{self, MovieQuery, NewMovie, PaginatedMovies};
use reelsync::{connect_and_migrate, paginate};

/// Output format for movie display.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Movie subcommands.
#[derive(Subcommand)]
pub(crate) enum MoviesAction {
    /// List stored movies matching the given filters
    List(ListArgs),
    /// Show one movie by TMDB id
    Get {
        /// TMDB movie id
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Add a movie from a JSON document
    Add {
        /// Path to a JSON file, or - to read stdin
        #[arg(long, value_name = "FILE")]
        json: String,
    },
    /// Delete one movie by TMDB id
    Delete {
        /// TMDB movie id
        id: i64,
    },
}

/// Filters for `movies list`. Ranges are inclusive; dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ListArgs {
    /// Exact TMDB id
    #[arg(long)]
    id: Option<i64>,
    /// Case-insensitive substring of the name
    #[arg(long)]
    name: Option<String>,
    /// Case-insensitive substring of the overview
    #[arg(long)]
    overview: Option<String>,

    #[arg(long)]
    popularity_gte: Option<f64>,
    #[arg(long)]
    popularity_lte: Option<f64>,
    #[arg(long)]
    vote_average_gte: Option<f64>,
    #[arg(long)]
    vote_average_lte: Option<f64>,
    #[arg(long)]
    vote_count_gte: Option<i64>,
    #[arg(long)]
    vote_count_lte: Option<i64>,
    #[arg(long)]
    release_date_gte: Option<String>,
    #[arg(long)]
    release_date_lte: Option<String>,

    /// Page number, 1-based (default 1)
    #[arg(short, long)]
    page: Option<i64>,
    /// Movies per page (default 10)
    #[arg(short, long)]
    limit: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl ListArgs {
    fn to_query(&self) -> MovieQuery {
        MovieQuery {
            id: self.id,
            name: self.name.clone(),
            overview: self.overview.clone(),
            popularity_gte: self.popularity_gte,
            popularity_lte: self.popularity_lte,
            vote_average_gte: self.vote_average_gte,
            vote_average_lte: self.vote_average_lte,
            vote_count_gte: self.vote_count_gte,
            vote_count_lte: self.vote_count_lte,
            release_date_gte: self.release_date_gte.clone(),
            release_date_lte: self.release_date_lte.clone(),
            page: self.page,
            limit: self.limit,
        }
    }
}

/// One movie as a table row.
#[derive(Debug, Clone, Tabled)]
struct MovieRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Released")]
    release_date: String,
    #[tabled(rename = "Rating")]
    vote_average: String,
    #[tabled(rename = "Votes")]
    vote_count: i64,
    #[tabled(rename = "Popularity")]
    popularity: String,
    #[tabled(rename = "Genres")]
    genres: String,
}

impl From<&Model> for MovieRow {
    fn from(movie: &Model) -> Self {
        Self {
            id: movie.id,
            name: movie.name.clone(),
            release_date: movie.release_date.clone(),
            vote_average: format!("{:.1}", movie.vote_average),
            vote_count: movie.vote_count,
            popularity: format!("{:.1}", movie.popularity),
            genres: movie
                .genre_list()
                .into_iter()
                .map(|g| g.name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Handle `reelsync movies ...`.
pub(crate) async fn handle_movies(
    action: MoviesAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_and_migrate(database_url).await?;

    match action {
        MoviesAction::List(args) => {
            let query = args.to_query();
            let page = repository::find_movies(&db, &query).await?;
            print_page(&page, &query, args.output)?;
        }
        MoviesAction::Get { id, output } => {
            let movie = repository::find_by_id(&db, id).await?;
            match output {
                OutputFormat::Table => {
                    print_table(vec![MovieRow::from(&movie)]);
                    if let Some(overview) = movie.overview.as_deref() {
                        println!("{}", overview);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&movie)?),
            }
        }
        MoviesAction::Add { json } => {
            let movie: NewMovie = serde_json::from_str(&read_input(&json)?)?;
            let saved = repository::save(&db, movie).await?;
            println!("Added movie {}: {}", saved.id, saved.name);
        }
        MoviesAction::Delete { id } => {
            let removed = repository::remove_by_id(&db, id).await?;
            println!("Deleted movie {}: {}", removed.id, removed.name);
        }
    }

    Ok(())
}

fn print_page(
    page: &PaginatedMovies,
    query: &MovieQuery,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<MovieRow> = page.data.iter().map(MovieRow::from).collect();
            if rows.is_empty() {
                println!("No movies found.");
            } else {
                print_table(rows);
            }
            println!("{}", page_footer(page, query));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
    }
    Ok(())
}

fn print_table(rows: Vec<MovieRow>) {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
}

fn page_footer(page: &PaginatedMovies, query: &MovieQuery) -> String {
    if page.data.is_empty() {
        return format!("Showing 0 of {} movies", page.total);
    }
    let window = paginate(query.page, query.limit);
    let last = window.skip + page.data.len() as u64;
    format!("Showing {}-{} of {} movies", window.skip + 1, last, page.total)
}

fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::{Cli, Commands};

    fn movie(id: i64) -> Model {
        let now = timestamp();
        Model {
            id,
            name: format!("Movie {id}"),
            overview: None,
            popularity: 12.345,
            vote_average: 8.46,
            vote_count: 1600,
            release_date: "1999-10-15".to_string(),
            genres: serde_json::json!([
                { "id": 18, "name": "Drama" },
                { "id": 53, "name": "Thriller" }
            ]),
            created_at: now,
            updated_at: now,
            name_search: format!("movie {id}"),
            overview_search: None,
        }
    }

    fn timestamp() -> sea_orm::prelude::DateTimeWithTimeZone {
        sea_orm::prelude::DateTimeWithTimeZone::parse_from_rfc3339("2026-10-01T00:00:00+00:00")
            .expect("valid timestamp")
    }

    fn list_args(argv: &[&str]) -> ListArgs {
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        match cli.command {
            Commands::Movies {
                action: MoviesAction::List(args),
            } => args,
            _ => panic!("expected movies list"),
        }
    }

    #[test]
    fn test_list_flags_map_to_query() {
        let args = list_args(&[
            "reelsync",
            "movies",
            "list",
            "--name",
            "god",
            "--vote-average-gte",
            "8.5",
            "--release-date-lte",
            "1999-12-31",
            "-p",
            "2",
            "-l",
            "5",
        ]);

        let query = args.to_query();
        assert_eq!(query.name.as_deref(), Some("god"));
        assert_eq!(query.vote_average_gte, Some(8.5));
        assert_eq!(query.release_date_lte.as_deref(), Some("1999-12-31"));
        assert_eq!((query.page, query.limit), (Some(2), Some(5)));
        assert!(query.id.is_none());
    }

    #[test]
    fn test_movie_row_formats_numbers_and_genres() {
        let row = MovieRow::from(&movie(238));
        assert_eq!(row.vote_average, "8.5");
        assert_eq!(row.popularity, "12.3");
        assert_eq!(row.genres, "Drama, Thriller");
    }

    #[test]
    fn test_page_footer_ranges() {
        let query = MovieQuery {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let page = PaginatedMovies {
            data: vec![movie(3), movie(4)],
            total: 5,
        };
        assert_eq!(page_footer(&page, &query), "Showing 3-4 of 5 movies");

        let empty = PaginatedMovies {
            data: Vec::new(),
            total: 0,
        };
        assert_eq!(
            page_footer(&empty, &MovieQuery::default()),
            "Showing 0 of 0 movies"
        );
    }
}
