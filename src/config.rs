//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or an environment variable, and every
//! option has a default, so `caster` runs with no arguments at all.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::source::endpoint::{DEFAULT_COINS_PER_PAGE, DEFAULT_PAGE_LIMIT};
use crate::source::{DEFAULT_MARKETS_URL, DEFAULT_SEARCH_URL};

#[derive(Debug, Clone, Parser)]
#[command(name = "caster", version, about = "Browse podcasts and live coin prices in the terminal")]
pub struct Config {
    /// Podcast search term.
    #[arg(long, env = "CASTER_TERM", default_value = "javascript")]
    pub term: String,

    /// Podcasts requested per page.
    #[arg(long, env = "CASTER_PAGE_LIMIT", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_limit: i64,

    /// Base URL of the podcast search endpoint.
    #[arg(long, env = "CASTER_PODCAST_URL", default_value = DEFAULT_SEARCH_URL)]
    pub podcast_url: String,

    /// Base URL of the coin markets endpoint.
    #[arg(long, env = "CASTER_COIN_URL", default_value = DEFAULT_MARKETS_URL)]
    pub coin_url: String,

    /// Coins requested per page.
    #[arg(long, env = "CASTER_COINS_PER_PAGE", default_value_t = DEFAULT_COINS_PER_PAGE)]
    pub coins_per_page: i64,

    /// HTTP request timeout, in seconds.
    #[arg(long, env = "CASTER_HTTP_TIMEOUT", default_value_t = 15)]
    pub http_timeout: u64,

    /// `tracing` filter used when RUST_LOG is unset, e.g. `info` or `caster=debug`.
    #[arg(long, env = "CASTER_LOG", default_value = "info")]
    pub log_level: String,

    /// Log file path (defaults to `caster.log` in the temp directory).
    #[arg(long, env = "CASTER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    /// Where log output goes; stdout belongs to the TUI.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("caster.log"))
    }
}
