//! reelsync CLI - keeps a local movie catalog in step with TMDB.

mod commands;
mod config;
mod progress;

use std::path::Path;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::movies::MoviesAction;
use crate::commands::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "reelsync")]
#[command(version)]
#[command(about = "Sync TMDB discovery results into a local movie catalog")]
#[command(
    long_about = "reelsync walks the TMDB discover listing, skips movies already stored, \
fetches details for the rest in concurrent chunks and stores them. Stored movies can be \
listed with exact, substring and range filters."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync with the configured discovery filters:
        $ reelsync sync

    See how many new movies a sync would fetch:
        $ reelsync sync --dry-run

    List highly rated movies released before 2000:
        $ reelsync movies list --vote-average-gte 8.5 --release-date-lte 1999-12-31

    Generate shell completions:
        $ reelsync completions bash > ~/.local/share/bash-completion/completions/reelsync

CONFIGURATION
    reelsync reads configuration from:
      1. ~/.config/reelsync/config.toml (or $XDG_CONFIG_HOME/reelsync/config.toml)
      2. ./reelsync.toml
      3. Environment variables (REELSYNC_* prefix, nested keys joined with __)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    REELSYNC_DATABASE_URL     Database connection string (default: ~/.local/state/reelsync/reelsync.db)
    TMDB_API_KEY              TMDB v3 API key (or REELSYNC_TMDB_API_KEY)
    RUST_LOG                  Log filter for non-interactive runs (default: reelsync=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover new movies on TMDB and store them
    Sync(SyncArgs),
    /// Query and manage stored movies
    Movies {
        #[command(subcommand)]
        action: MoviesAction,
    },
    /// Manage the movie store schema
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Roll back the most recent migration
    Down,
    /// Show migration status
    Status,
    /// Drop the movie store and recreate it empty
    Fresh,
}

/// Structured log lines for non-interactive runs; a terminal gets progress bars instead.
fn init_logging() {
    if Term::stdout().is_term() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelsync=info,reelsync_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Filesystem path of an on-disk SQLite URL, without query parameters.
fn sqlite_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty() && !path.contains(":memory:")).then(|| Path::new(path))
}

/// Create the directory holding the SQLite file, if any.
fn prepare_store_dir(database_url: &str) -> std::io::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };
    if path.is_relative() {
        tracing::warn!(
            path = %path.display(),
            "SQLite path is relative to the working directory; prefer an absolute path"
        );
    }
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = config::Config::load();
    let cli = Cli::parse();

    let database_url = match cli.command {
        Commands::Completions { shell } => return commands::meta::handle_completions(shell),
        _ => config
            .database_url()
            .ok_or("Could not determine a database URL; set database.url in reelsync.toml")?,
    };
    prepare_store_dir(&database_url)?;

    match cli.command {
        Commands::Sync(args) => commands::sync::handle_sync(args, &config, &database_url).await,
        Commands::Movies { action } => commands::movies::handle_movies(action, &database_url).await,
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_path_strips_scheme_and_query() {
        assert_eq!(
            sqlite_path("sqlite:///var/lib/reelsync/reelsync.db?mode=rwc"),
            Some(Path::new("/var/lib/reelsync/reelsync.db"))
        );
        assert_eq!(sqlite_path("sqlite://movies.db"), Some(Path::new("movies.db")));
    }

    #[test]
    fn test_sqlite_path_ignores_other_stores() {
        assert_eq!(sqlite_path("sqlite::memory:"), None);
        assert_eq!(sqlite_path("sqlite://:memory:"), None);
        assert_eq!(sqlite_path("postgres://localhost/reelsync"), None);
    }

    #[test]
    fn test_prepare_store_dir_is_noop_without_parent() {
        assert!(prepare_store_dir("sqlite://movies.db?mode=rwc").is_ok());
        assert!(prepare_store_dir("postgres://localhost/reelsync").is_ok());
    }
}
