//! Catalog sync command.

use std::sync::Arc;

use console::style;

use reelsync::sync::{SyncError, SyncOptions, SyncResult, synchronize};
use reelsync::tmdb::{TmdbClient, short_error_message};
use reelsync::{RateLimitedClient, connect_and_migrate};

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Options for a sync run.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SyncArgs {
    /// Detail fetches per chunk (default from config or 40)
    #[arg(short = 'c', long)]
    chunk_size: Option<usize>,

    /// Dry run - discover and dedupe without fetching details or writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Disable proactive rate limiting (may cause API throttling)
    #[arg(short = 'R', long)]
    no_rate_limit: bool,

    /// Fail if discovery runs past this many pages (default from config, unlimited)
    #[arg(long)]
    max_pages: Option<u32>,
}

/// Handle `reelsync sync`.
pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tmdb_config = config.tmdb_config()?;
    if args.max_pages.is_some() {
        tmdb_config = tmdb_config.with_max_pages(args.max_pages);
    }

    let options = SyncOptions {
        chunk_size: args.chunk_size.unwrap_or(config.sync.chunk_size),
        dry_run: args.dry_run,
    };
    let no_rate_limit = args.no_rate_limit || config.sync.no_rate_limit;

    let db = connect_and_migrate(database_url).await?;
    let client = TmdbClient::new(tmdb_config)?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let outcome = if no_rate_limit {
        eprintln!("Warning: Rate limiting disabled - you may experience API throttling\n");
        synchronize(&client, &db, &options, Some(&callback)).await
    } else {
        let client = RateLimitedClient::new(client, config.tmdb.requests_per_second);
        synchronize(&client, &db, &options, Some(&callback)).await
    };

    reporter.finish();

    match outcome {
        Ok(result) => {
            println!();
            for line in summary_lines(&result, options.dry_run) {
                println!("{}", line);
            }
            Ok(())
        }
        Err(e) => {
            let brief = match &e {
                SyncError::Upstream(upstream) => short_error_message(upstream),
                other => other.to_string(),
            };
            eprintln!("{} {}", style("Sync failed:").red().bold(), brief);
            eprintln!("  Movies stored before the failure were kept.");
            Err(e.into())
        }
    }
}

fn summary_lines(result: &SyncResult, dry_run: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} discovered, {} already stored, {} new",
        style("Sync complete:").green().bold(),
        result.discovered,
        result.existing,
        result.new_candidates
    )];

    if dry_run {
        lines.push(format!(
            "  Dry run: {} movies would be fetched and stored",
            result.new_candidates
        ));
        return lines;
    }

    lines.push(format!(
        "  Inserted: {}, Skipped: {}, Failed: {} ({} chunks)",
        result.inserted, result.skipped, result.failed, result.chunks
    ));
    if result.failed > 0 {
        lines.push(format!(
            "  {} movies failed to insert; rerun sync to retry them.",
            style(result.failed).yellow()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SyncResult {
        SyncResult {
            discovered: 120,
            existing: 100,
            new_candidates: 20,
            fetched: 20,
            inserted: 19,
            skipped: 0,
            failed: 1,
            chunks: 1,
        }
    }

    #[test]
    fn test_summary_reports_counts() {
        console::set_colors_enabled(false);
        let lines = summary_lines(&result(), false);
        assert_eq!(
            lines[0],
            "Sync complete: 120 discovered, 100 already stored, 20 new"
        );
        assert_eq!(lines[1], "  Inserted: 19, Skipped: 0, Failed: 1 (1 chunks)");
        assert!(lines[2].contains("rerun sync"));
    }

    #[test]
    fn test_summary_for_dry_run() {
        console::set_colors_enabled(false);
        let lines = summary_lines(&result(), true);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("20 movies would be fetched"));
    }
}
