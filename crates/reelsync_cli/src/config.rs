//! Configuration file support for reelsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `REELSYNC_`, nested keys joined
//!    with `__`, e.g. `REELSYNC_TMDB__MAX_PAGES`)
//! 3. Config file (./reelsync.toml, then ~/.config/reelsync/config.toml)
//! 4. Built-in defaults
//!
//! `REELSYNC_DATABASE_URL`, `REELSYNC_TMDB_API_KEY` and the bare
//! `TMDB_API_KEY` are honoured as fallbacks when nothing else set those keys.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/reelsync/reelsync.db"  # optional, this is the default
//!
//! [tmdb]
//! api_key = "..."  # or use TMDB_API_KEY env var
//! retry_delay_ms = 3000
//! requests_per_second = 20
//!
//! [tmdb.discover]
//! "vote_average.gte" = "8.0"
//! watch_region = "DE"
//!
//! [sync]
//! chunk_size = 40
//! no_rate_limit = false
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use reelsync::rate_limit::TMDB_DEFAULT_RPS;
use reelsync::retry::{DEFAULT_RETRY_DELAY_MS, RetryPolicy};
use reelsync::sync::DEFAULT_CHUNK_SIZE;
use reelsync::tmdb::{DEFAULT_BASE_URL, DiscoverParams, TmdbConfig};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// TMDB API configuration.
    pub tmdb: TmdbSection,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/reelsync/reelsync.db` if not specified.
    pub url: Option<String>,
}

/// TMDB API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TmdbSection {
    /// TMDB v3 API key.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Wait between retries of a throttled request.
    pub retry_delay_ms: u64,
    /// Retries per request before giving up. Unset retries forever.
    pub max_retries: Option<usize>,
    /// Stop discovery with an error past this many pages. Unset trusts the server.
    pub max_pages: Option<u32>,
    /// Proactive pacing for remote calls.
    pub requests_per_second: u32,
    /// Overrides for the discovery query parameters.
    pub discover: BTreeMap<String, String>,
}

impl Default for TmdbSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retries: None,
            max_pages: None,
            requests_per_second: TMDB_DEFAULT_RPS,
            discover: BTreeMap::new(),
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Detail fetches per chunk.
    pub chunk_size: usize,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            no_rate_limit: false,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/reelsync/config.toml)
    /// 3. Local config file (./reelsync.toml)
    /// 4. Environment variables with REELSYNC_ prefix
    /// 5. Fallback environment variables
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "reelsync") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("reelsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./reelsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // REELSYNC_TMDB__MAX_PAGES -> tmdb.max_pages
        builder = builder.add_source(
            Environment::with_prefix("REELSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_env_fallbacks(|name| std::env::var(name).ok());
        config
    }

    /// Fill keys nothing else set from single-underscore environment names.
    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.database.url.is_none() {
            self.database.url = non_empty("REELSYNC_DATABASE_URL");
        }
        if self.tmdb.api_key.is_none() {
            self.tmdb.api_key =
                non_empty("REELSYNC_TMDB_API_KEY").or_else(|| non_empty("TMDB_API_KEY"));
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// If no database URL is configured, defaults to `sqlite://~/.local/state/reelsync/reelsync.db?mode=rwc`
    /// on Linux (using XDG state directory) or the platform-appropriate equivalent.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("reelsync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Build the TMDB client configuration.
    ///
    /// # Errors
    /// Returns a message naming the missing setting if no API key is configured.
    pub fn tmdb_config(&self) -> Result<TmdbConfig, String> {
        let api_key = self
            .tmdb
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                "No TMDB API key configured. Set tmdb.api_key in reelsync.toml \
                 or the TMDB_API_KEY environment variable."
                    .to_string()
            })?;

        let mut retry = RetryPolicy::new(Duration::from_millis(self.tmdb.retry_delay_ms));
        if let Some(max_retries) = self.tmdb.max_retries {
            retry = retry.with_max_attempts(max_retries);
        }

        let discover = self
            .tmdb
            .discover
            .iter()
            .fold(DiscoverParams::default(), |params, (key, value)| {
                params.with(key.as_str(), value)
            });

        Ok(TmdbConfig::new(api_key)
            .with_base_url(self.tmdb.base_url.clone())
            .with_retry(retry)
            .with_max_pages(self.tmdb.max_pages)
            .with_discover(discover))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/reelsync` or `~/.local/state/reelsync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "reelsync").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
